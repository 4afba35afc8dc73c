//! Host toolchain and tool locations.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::process::{Invocation, ProcessRunner};

/// Programs painless shells out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    /// The Go toolchain binary.
    pub go: String,
    /// The git client.
    pub git: String,
    /// This binary, re-run for nested restores.
    pub self_exe: PathBuf,
}

impl Tools {
    /// `go` and `git` from `PATH`, and the currently running executable.
    pub fn from_path() -> Self {
        let self_exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("painless"));
        Tools {
            go: "go".to_string(),
            git: "git".to_string(),
            self_exe,
        }
    }
}

/// Thin wrapper over the `go` commands painless needs.
pub struct GoToolchain<'r> {
    program: &'r str,
    runner: &'r dyn ProcessRunner,
}

impl<'r> GoToolchain<'r> {
    pub fn new(tools: &'r Tools, runner: &'r dyn ProcessRunner) -> Self {
        GoToolchain {
            program: &tools.go,
            runner,
        }
    }

    /// `go get <uri>` in `project_dir`.
    pub fn get(&self, uri: &str, project_dir: &Path) -> Result<()> {
        self.run(Invocation::new(self.program, ["get", uri]).in_dir(project_dir))
    }

    /// `go mod init <module>` in `dir`.
    pub fn mod_init(&self, module: &str, dir: &Path) -> Result<()> {
        self.run(Invocation::new(self.program, ["mod", "init", module]).in_dir(dir))
    }

    /// `go mod init`, logging instead of failing. The descriptor usually
    /// exists already, which `go` reports as an error.
    pub fn mod_init_lenient(&self, module: &str, dir: &Path) {
        if let Err(e) = self.mod_init(module, dir) {
            tracing::warn!(module, dir = %dir.display(), "could not create go.mod: {e}");
        }
    }

    /// `go mod tidy` in `dir`.
    pub fn mod_tidy(&self, dir: &Path) -> Result<()> {
        self.run(Invocation::new(self.program, ["mod", "tidy"]).in_dir(dir))
    }

    /// `go build -o <output> <target>` cross-compiled for `goos`/`goarch`.
    pub fn build(
        &self,
        project_dir: &Path,
        goos: &str,
        goarch: &str,
        output: &str,
        target: &str,
    ) -> Result<()> {
        self.run(
            Invocation::new(self.program, ["build", "-o", output, target])
                .in_dir(project_dir)
                .with_env("GOOS", goos)
                .with_env("GOARCH", goarch),
        )
    }

    fn run(&self, invocation: Invocation) -> Result<()> {
        self.runner.run(&invocation).map(|_| ())
    }
}
