//! `go.mod` grammar for the entries painless manages.
//!
//! The descriptor belongs to the Go toolchain, so it is parsed only as far as
//! painless needs: `require` and `replace` directives (single-line or in
//! parenthesised blocks) become [`Entry`] records, and every other line is
//! carried verbatim. Rendering an unmodified descriptor reproduces its lines
//! exactly.

use std::path::Path;

use crate::error::{CoreError, Result};
use crate::probe;

/// File name of the module descriptor inside a project directory.
pub const DESCRIPTOR_FILE: &str = "go.mod";

/// The kind of a managed descriptor entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// `replace <id> => <path>`: points a module at a local directory.
    Redirect,
    /// `require <id> <version>`: declares a module at a version.
    Requirement,
}

impl EntryKind {
    /// The directive keyword for this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            EntryKind::Redirect => "replace",
            EntryKind::Requirement => "require",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "replace" => Some(EntryKind::Redirect),
            "require" => Some(EntryKind::Requirement),
            _ => None,
        }
    }
}

/// A `require` or `replace` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Module path on the left-hand side.
    pub identifier: String,
    /// Directive kind.
    pub kind: EntryKind,
    /// Redirect target path, or required version.
    pub payload: String,
    /// Source text of the line, rendered back unchanged.
    raw: String,
}

impl Entry {
    /// A new `replace <id> => "<path>"` line.
    pub fn redirect(identifier: &str, path: &str) -> Self {
        Entry {
            identifier: identifier.to_string(),
            kind: EntryKind::Redirect,
            payload: path.to_string(),
            raw: format!("replace {identifier} => {}", quote(path)),
        }
    }

    /// A new `require <id> <version>` line.
    pub fn requirement(identifier: &str, version: &str) -> Self {
        Entry {
            identifier: identifier.to_string(),
            kind: EntryKind::Requirement,
            payload: version.to_string(),
            raw: format!("require {identifier} {version}"),
        }
    }

    /// The line as it appears in the file.
    pub fn as_line(&self) -> &str {
        &self.raw
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Verbatim(String),
    Blank,
    Entry(Entry),
    Block {
        open: String,
        lines: Vec<BlockLine>,
        close: String,
    },
}

/// A `require (` or `replace (` block still being read.
struct OpenBlock {
    line: usize,
    kind: EntryKind,
    open: String,
    lines: Vec<BlockLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BlockLine {
    Entry(Entry),
    Other(String),
}

/// Line terminator used when rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// The terminator of the first line of `input`.
    fn detect(input: &str) -> Self {
        match input.find('\n') {
            Some(end) if input[..end].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A parsed `go.mod` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDescriptor {
    items: Vec<Item>,
    line_ending: LineEnding,
}

impl ModuleDescriptor {
    /// Parse descriptor text.
    pub fn parse(input: &str) -> Result<Self> {
        let mut items = Vec::new();
        let line_ending = LineEnding::detect(input);
        if input.is_empty() {
            return Ok(ModuleDescriptor { items, line_ending });
        }
        let mut open_block: Option<OpenBlock> = None;

        for (index, raw) in input.split('\n').enumerate() {
            let line_no = index + 1;
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            let trimmed = raw.trim();

            if let Some(block) = open_block.as_mut() {
                if trimmed.starts_with(')') {
                    items.push(Item::Block {
                        open: std::mem::take(&mut block.open),
                        lines: std::mem::take(&mut block.lines),
                        close: raw.to_string(),
                    });
                    open_block = None;
                } else if trimmed.is_empty() || trimmed.starts_with("//") {
                    block.lines.push(BlockLine::Other(raw.to_string()));
                } else {
                    let entry = parse_entry(block.kind, trimmed, raw, line_no)?;
                    block.lines.push(BlockLine::Entry(entry));
                }
                continue;
            }

            if trimmed.is_empty() {
                items.push(Item::Blank);
                continue;
            }

            match split_directive(trimmed) {
                Some((kind, rest)) if rest.starts_with('(') => {
                    if rest[1..].trim().starts_with(')') {
                        // `require ()` holds nothing worth editing.
                        items.push(Item::Verbatim(raw.to_string()));
                    } else {
                        open_block = Some(OpenBlock {
                            line: line_no,
                            kind,
                            open: raw.to_string(),
                            lines: Vec::new(),
                        });
                    }
                }
                Some((kind, rest)) => {
                    items.push(Item::Entry(parse_entry(kind, rest, raw, line_no)?));
                }
                None => items.push(Item::Verbatim(raw.to_string())),
            }
        }

        if let Some(block) = open_block {
            return Err(CoreError::DescriptorParse {
                line: block.line,
                detail: format!("unterminated {} block", block.kind.keyword()),
            });
        }

        // `split` yields a trailing empty piece for newline-terminated input.
        if input.ends_with('\n') && matches!(items.last(), Some(Item::Blank)) {
            items.pop();
        }

        Ok(ModuleDescriptor { items, line_ending })
    }

    /// Load the descriptor from `project_dir`.
    pub fn load(project_dir: &Path) -> Result<Self> {
        Self::parse(&probe::read_to_string(&project_dir.join(DESCRIPTOR_FILE))?)
    }

    /// Iterate over every `require`/`replace` entry, in file order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.items.iter().flat_map(|item| {
            let entries: Vec<&Entry> = match item {
                Item::Entry(entry) => vec![entry],
                Item::Block { lines, .. } => lines
                    .iter()
                    .filter_map(|line| match line {
                        BlockLine::Entry(entry) => Some(entry),
                        BlockLine::Other(_) => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            entries
        })
    }

    /// The `module` path declared by the descriptor, if any.
    pub fn module_path(&self) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            Item::Verbatim(line) => {
                let rest = line.trim().strip_prefix("module")?;
                if !rest.starts_with(char::is_whitespace) {
                    return None;
                }
                let path = rest.trim();
                Some(path.trim_matches('"'))
            }
            _ => None,
        })
    }

    /// Keep only the entries for which `keep` returns true.
    ///
    /// Blocks whose entries are all removed are dropped with their
    /// parentheses. Returns the number of entries removed.
    pub fn retain_entries(&mut self, mut keep: impl FnMut(&Entry) -> bool) -> usize {
        let mut removed = 0;
        self.items.retain_mut(|item| match item {
            Item::Entry(entry) => {
                let kept = keep(entry);
                if !kept {
                    removed += 1;
                }
                kept
            }
            Item::Block { lines, .. } => {
                let had_entries = lines.iter().any(|l| matches!(l, BlockLine::Entry(_)));
                lines.retain(|line| match line {
                    BlockLine::Entry(entry) => {
                        let kept = keep(entry);
                        if !kept {
                            removed += 1;
                        }
                        kept
                    }
                    BlockLine::Other(_) => true,
                });
                let has_entries = lines.iter().any(|l| matches!(l, BlockLine::Entry(_)));
                !had_entries || has_entries
            }
            _ => true,
        });
        removed
    }

    /// Collapse runs of blank lines into one and drop leading and trailing
    /// blank lines.
    pub fn compact_blank_lines(&mut self) {
        let mut previous_blank = true;
        self.items.retain(|item| {
            let blank = matches!(item, Item::Blank);
            let keep = !(blank && previous_blank);
            previous_blank = blank;
            keep
        });
        while matches!(self.items.last(), Some(Item::Blank)) {
            self.items.pop();
        }
    }

    /// Append a single-line entry.
    pub fn push_entry(&mut self, entry: Entry) {
        self.items.push(Item::Entry(entry));
    }

    /// Append a blank separator line, unless the descriptor is empty.
    pub fn push_blank(&mut self) {
        if !self.items.is_empty() {
            self.items.push(Item::Blank);
        }
    }

    /// Render back to text, one line per item, each terminated with the
    /// line ending of the parsed input.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let eol = self.line_ending.as_str();
        let push_line = |out: &mut String, line: &str| {
            out.push_str(line);
            out.push_str(eol);
        };
        for item in &self.items {
            match item {
                Item::Verbatim(line) => push_line(&mut out, line),
                Item::Blank => push_line(&mut out, ""),
                Item::Entry(entry) => push_line(&mut out, &entry.raw),
                Item::Block { open, lines, close } => {
                    push_line(&mut out, open);
                    for line in lines {
                        match line {
                            BlockLine::Entry(entry) => push_line(&mut out, &entry.raw),
                            BlockLine::Other(text) => push_line(&mut out, text),
                        }
                    }
                    push_line(&mut out, close);
                }
            }
        }
        out
    }
}

/// Split `require …`/`replace …` into its kind and the rest of the line.
fn split_directive(line: &str) -> Option<(EntryKind, &str)> {
    let word_end = line
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(line.len());
    let kind = EntryKind::from_keyword(&line[..word_end])?;
    Some((kind, line[word_end..].trim_start()))
}

fn parse_entry(kind: EntryKind, body: &str, raw: &str, line: usize) -> Result<Entry> {
    let tokens = tokenize(body).map_err(|detail| CoreError::DescriptorParse { line, detail })?;
    let malformed = |detail: &str| CoreError::DescriptorParse {
        line,
        detail: detail.to_string(),
    };

    let (identifier, payload) = match kind {
        EntryKind::Requirement => match tokens.as_slice() {
            [id, version, ..] if id != "=>" && version != "=>" => (id.clone(), version.clone()),
            _ => return Err(malformed("require needs a module path and a version")),
        },
        EntryKind::Redirect => {
            let arrow = tokens
                .iter()
                .position(|t| t == "=>")
                .ok_or_else(|| malformed("replace is missing '=>'"))?;
            let (left, right) = (&tokens[..arrow], &tokens[arrow + 1..]);
            if left.is_empty() || left.len() > 2 {
                return Err(malformed("replace needs a module path before '=>'"));
            }
            if right.is_empty() || right.len() > 2 {
                return Err(malformed("replace needs a target after '=>'"));
            }
            (left[0].clone(), right[0].clone())
        }
    };

    Ok(Entry {
        identifier,
        kind,
        payload,
        raw: raw.to_string(),
    })
}

/// Split a directive body into tokens, unquoting strings and stopping at a
/// `//` comment. `=>` is always its own token.
fn tokenize(body: &str) -> std::result::Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut chars = body.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        match c {
            '"' => {
                chars.next();
                let mut token = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => token.push(escaped),
                            None => return Err("unterminated string".to_string()),
                        },
                        Some(other) => token.push(other),
                        None => return Err("unterminated string".to_string()),
                    }
                }
                tokens.push(token);
            }
            '`' => {
                chars.next();
                let mut token = String::new();
                loop {
                    match chars.next() {
                        Some('`') => break,
                        Some(other) => token.push(other),
                        None => return Err("unterminated raw string".to_string()),
                    }
                }
                tokens.push(token);
            }
            _ => {
                let mut token = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '"' || c == '`' {
                        break;
                    }
                    if token.ends_with('=') && c == '>' {
                        token.pop();
                        if !token.is_empty() {
                            tokens.push(std::mem::take(&mut token));
                        }
                        token.push_str("=>");
                        chars.next();
                        break;
                    }
                    token.push(c);
                    chars.next();
                }
                if token.starts_with("//") {
                    break;
                }
                if let Some(pos) = token.find("//") {
                    token.truncate(pos);
                    if !token.is_empty() {
                        tokens.push(token);
                    }
                    break;
                }
                if !token.is_empty() {
                    tokens.push(token);
                }
            }
        }
    }
    Ok(tokens)
}

/// Quote a path as a Go string literal.
fn quote(path: &str) -> String {
    format!("\"{}\"", path.replace('\\', "\\\\").replace('"', "\\\""))
}
