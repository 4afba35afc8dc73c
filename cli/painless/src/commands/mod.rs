//! CLI command implementations.

pub mod cache;
pub mod clean;
pub mod create;
pub mod init;
pub mod install;
pub mod publish;
pub mod remove;
pub mod restore;

use anyhow::Result;
use painless_core::{PackageCache, DESCRIPTOR_FILE, MANIFEST_FILE};
use painless_resolve::{Environment, GoToolchain, ProcessRunner, Resolver, Tools};

/// What a command needs from outside the project directory.
pub struct Session<'r> {
    pub cache: PackageCache,
    pub tools: Tools,
    pub runner: &'r dyn ProcessRunner,
}

impl<'r> Session<'r> {
    /// True under `--dry-run`: commands are printed and files left alone.
    pub fn dry_run(&self) -> bool {
        !self.runner.executes()
    }

    pub fn environment(&self) -> Environment<'r> {
        Environment {
            cache: self.cache.clone(),
            tools: self.tools.clone(),
            runner: self.runner,
        }
    }

    pub fn toolchain(&self) -> GoToolchain<'_> {
        GoToolchain::new(&self.tools, self.runner)
    }

    /// Write the resolver's result, or say what would be written.
    pub fn write(&self, resolver: &Resolver<'_>) -> Result<()> {
        if self.dry_run() {
            println!("would write {MANIFEST_FILE} and {DESCRIPTOR_FILE}");
            return Ok(());
        }
        resolver.write()?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    use painless_resolve::{Captured, Invocation, ProcessRunner, Result};

    use super::Session;

    /// Runner that records calls and fakes `git clone` by creating the
    /// destination directory.
    #[derive(Default)]
    pub struct FakeRunner {
        calls: RefCell<Vec<Invocation>>,
    }

    impl FakeRunner {
        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.borrow().clone()
        }

        pub fn command_lines(&self) -> Vec<String> {
            self.calls.borrow().iter().map(Invocation::command_line).collect()
        }
    }

    impl ProcessRunner for FakeRunner {
        fn run(&self, invocation: &Invocation) -> Result<Captured> {
            self.calls.borrow_mut().push(invocation.clone());
            if invocation.args.first().map(String::as_str) == Some("clone") {
                let dest = PathBuf::from(&invocation.args[2]);
                std::fs::create_dir_all(dest.join(".git")).unwrap();
            }
            Ok(Captured::default())
        }
    }

    pub fn session<'r>(root: &Path, runner: &'r dyn ProcessRunner) -> Session<'r> {
        Session {
            cache: painless_core::PackageCache::new(root.join("packages")),
            tools: painless_resolve::Tools {
                go: "go".to_string(),
                git: "git".to_string(),
                self_exe: PathBuf::from("/usr/local/bin/painless"),
            },
            runner,
        }
    }
}
