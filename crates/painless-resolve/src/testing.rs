//! Scripted process runner for resolver tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{ResolveError, Result};
use crate::process::{Captured, Invocation, ProcessRunner};
use crate::toolchain::Tools;

/// Records every invocation and fakes the filesystem effects of
/// `git clone`: the destination directory is created with a `.git`
/// directory, plus a nested `package.json` for sources registered through
/// `with_nested_manifest`.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    calls: RefCell<Vec<Invocation>>,
    failures: RefCell<Vec<(String, String)>>,
    nested: RefCell<HashMap<String, String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every `<program> <subcommand> …` invocation.
    pub fn fail_on(&self, program: &str, subcommand: &str) {
        self.failures
            .borrow_mut()
            .push((program.to_string(), subcommand.to_string()));
    }

    /// Stop failing anything.
    pub fn clear_failures(&self) {
        self.failures.borrow_mut().clear();
    }

    /// Clones of `source` get a `package.json` holding `manifest_json`.
    pub fn with_nested_manifest(&self, source: &str, manifest_json: &str) {
        self.nested
            .borrow_mut()
            .insert(source.to_string(), manifest_json.to_string());
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Number of calls whose first argument is `subcommand`.
    pub fn count(&self, program: &str, subcommand: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program == program && c.args.first().map(String::as_str) == Some(subcommand))
            .count()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<Captured> {
        self.calls.borrow_mut().push(invocation.clone());

        let subcommand = invocation.args.first().cloned().unwrap_or_default();
        let fails = self
            .failures
            .borrow()
            .iter()
            .any(|(program, sub)| *program == invocation.program && *sub == subcommand);
        if fails {
            return Err(ResolveError::FetchFailure {
                command: invocation.command_line(),
                exit_code: Some(128),
                stderr: "fatal: repository not found\n".to_string(),
            });
        }

        if subcommand == "clone" {
            let source = &invocation.args[1];
            let dest = PathBuf::from(&invocation.args[2]);
            std::fs::create_dir_all(dest.join(".git")).unwrap();
            std::fs::write(dest.join("main.go"), "package lib\n").unwrap();
            if let Some(json) = self.nested.borrow().get(source) {
                std::fs::write(dest.join(painless_core::MANIFEST_FILE), json).unwrap();
            }
        }
        Ok(Captured::default())
    }
}

pub(crate) fn tools() -> Tools {
    Tools {
        go: "go".to_string(),
        git: "git".to_string(),
        self_exe: PathBuf::from("/usr/local/bin/painless"),
    }
}
