//! Shared cache of cloned private dependencies.
//!
//! Every private dependency is cloned once into a cache shared by all
//! projects of the user. Entries are keyed by dependency name *and* source,
//! so two unrelated repositories that happen to share a name never collide:
//!
//! ```text
//! <cache_root>/
//!   github.com/acme/auth@3f29c1a0b7de/   working copy of one source
//!   tools@9a0e11c2f4b5/
//! ```
//!
//! The suffix is the first 12 hex digits of the SHA-256 of the normalized
//! source URL. There is no version in the key: updating an entry means
//! deleting and re-cloning it.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{CoreError, Result};
use crate::probe;

/// Number of hex digits of the source hash kept in entry names.
const SOURCE_ID_LEN: usize = 12;

/// A shared package cache backed by the filesystem.
#[derive(Debug, Clone)]
pub struct PackageCache {
    /// Root directory for the cache.
    root: PathBuf,
}

/// A working copy found in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Entry key relative to the cache root (`<name>@<source-id>`).
    pub key: String,
    /// Absolute path of the working copy.
    pub path: PathBuf,
}

impl PackageCache {
    /// Create a cache rooted at the given directory.
    pub fn new(root: PathBuf) -> Self {
        PackageCache { root }
    }

    /// The cache under a painless home directory (`<home>/packages`).
    pub fn in_home(painless_home: &Path) -> Self {
        PackageCache::new(painless_home.join("packages"))
    }

    /// Get the root directory of this cache.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the cache root if it does not exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        probe::ensure_dir(&self.root)
    }

    /// Entry key for a dependency: `<name>@<source-id>`.
    pub fn entry_key(name: &str, source: &str) -> String {
        format!("{name}@{}", source_id(source))
    }

    /// Working-copy directory for a dependency.
    pub fn entry_dir(&self, name: &str, source: &str) -> PathBuf {
        self.root.join(Self::entry_key(name, source))
    }

    /// Check if a dependency is already cloned.
    pub fn contains(&self, name: &str, source: &str) -> Result<bool> {
        probe::exists(&self.entry_dir(name, source))
    }

    /// Remove a cached working copy. Returns `false` if it was not cached.
    pub fn remove(&self, name: &str, source: &str) -> Result<bool> {
        let dir = self.entry_dir(name, source);
        let removed = probe::remove_dir(&dir)?;
        if removed {
            tracing::debug!(path = %dir.display(), "removed cache entry");
        }
        Ok(removed)
    }

    /// Whether `path` points inside this cache.
    ///
    /// Redirects into the cache are the ones painless wrote itself.
    pub fn holds(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    /// List every working copy in the cache, sorted by key.
    ///
    /// Dependency names may contain `/`, so entries can sit several
    /// directories deep; a directory whose name ends in `@<source-id>` is an
    /// entry and is not descended into.
    pub fn list_entries(&self) -> Result<Vec<CacheEntry>> {
        let mut entries = Vec::new();
        if probe::exists(&self.root)? {
            self.collect_entries(&self.root, &mut entries)?;
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    fn collect_entries(&self, dir: &Path, out: &mut Vec<CacheEntry>) -> Result<()> {
        let read = std::fs::read_dir(dir).map_err(|e| CoreError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        for entry in read {
            let entry = entry.map_err(|e| CoreError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if is_entry_dir_name(&file_name) {
                let key = path
                    .strip_prefix(&self.root)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('\\', "/");
                out.push(CacheEntry { key, path });
            } else {
                self.collect_entries(&path, out)?;
            }
        }
        Ok(())
    }
}

/// Normalize a version-control URL the way it is cloned.
///
/// A scheme (`https://`, `ssh://`, `file://`) or scp-style `git@host:` prefix
/// is kept; anything else is assumed to be an HTTPS host path. A `.git`
/// suffix is appended when missing.
pub fn normalize_source(uri: &str) -> String {
    let uri = uri.trim();
    let mut normalized = if uri.contains("://") || uri.starts_with("git@") {
        uri.to_string()
    } else {
        format!("https://{uri}")
    };
    if !normalized.ends_with(".git") {
        normalized.push_str(".git");
    }
    normalized
}

/// Short, stable identity of a dependency source.
pub fn source_id(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_source(source).as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..SOURCE_ID_LEN].to_string()
}

fn is_entry_dir_name(name: &str) -> bool {
    match name.rsplit_once('@') {
        Some((base, id)) => {
            !base.is_empty()
                && id.len() == SOURCE_ID_LEN
                && id.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}
