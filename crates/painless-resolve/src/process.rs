//! Synchronous external command execution.
//!
//! The `ProcessRunner` trait is the seam between resolution logic and the
//! `git`/`go` binaries. `SystemRunner` runs commands for real; `DryRunRunner`
//! only records and prints them.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ResolveError, Result};

/// A command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path.
    pub program: String,
    /// Arguments, passed through without shell interpretation.
    pub args: Vec<String>,
    /// Working directory; the caller's when `None`.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables for the child only.
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: Vec::new(),
        }
    }

    /// Run inside `dir`.
    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Set an environment variable on the child.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// The command as a single line, for logs and errors.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Output captured from a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands to completion.
pub trait ProcessRunner {
    /// Run `invocation`, blocking until it exits.
    ///
    /// A non-zero exit is reported as [`ResolveError::FetchFailure`].
    fn run(&self, invocation: &Invocation) -> Result<Captured>;

    /// Whether commands actually execute. Callers skip inspecting a command's
    /// filesystem effects when this is false.
    fn executes(&self) -> bool {
        true
    }
}

/// Runs commands with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<Captured> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        tracing::debug!(command = %invocation.command_line(), cwd = ?invocation.cwd, "running");
        let output = cmd.output().map_err(|source| ResolveError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        let captured = Captured {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        for text in [&captured.stderr, &captured.stdout] {
            let text = text.trim_end();
            if !text.is_empty() {
                tracing::info!(program = %invocation.program, "{text}");
            }
        }

        if !output.status.success() {
            return Err(ResolveError::FetchFailure {
                command: invocation.command_line(),
                exit_code: output.status.code(),
                stderr: captured.stderr,
            });
        }
        Ok(captured)
    }
}

/// Prints commands instead of running them.
#[derive(Debug, Default)]
pub struct DryRunRunner {
    invocations: RefCell<Vec<Invocation>>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command seen so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }
}

impl ProcessRunner for DryRunRunner {
    fn run(&self, invocation: &Invocation) -> Result<Captured> {
        match &invocation.cwd {
            Some(dir) => println!("would run: {} (in {})", invocation.command_line(), dir.display()),
            None => println!("would run: {}", invocation.command_line()),
        }
        self.invocations.borrow_mut().push(invocation.clone());
        Ok(Captured::default())
    }

    fn executes(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_joins_arguments() {
        let inv = Invocation::new("git", ["clone", "https://example.com/a.git", "a"]);
        assert_eq!(inv.command_line(), "git clone https://example.com/a.git a");
    }

    #[test]
    fn builder_sets_dir_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("go", ["build"])
            .in_dir(dir.path())
            .with_env("GOOS", "linux");
        assert_eq!(inv.cwd.as_deref(), Some(dir.path()));
        assert_eq!(inv.env, vec![("GOOS".to_string(), "linux".to_string())]);
    }

    #[test]
    fn dry_run_records_without_executing() {
        let runner = DryRunRunner::new();
        let inv = Invocation::new("definitely-not-a-real-binary", ["--flag"]);
        runner.run(&inv).unwrap();
        assert_eq!(runner.invocations(), vec![inv]);
        assert!(!runner.executes());
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let inv = Invocation::new("painless-test-no-such-program", Vec::<String>::new());
        let err = SystemRunner.run(&inv).unwrap_err();
        assert!(matches!(err, ResolveError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_carries_code_and_stderr() {
        let inv = Invocation::new("sh", ["-c", "echo boom >&2; exit 3"]);
        match SystemRunner.run(&inv).unwrap_err() {
            ResolveError::FetchFailure {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_working_directory_with_env() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("sh", ["-c", "pwd; echo $PAINLESS_TEST"])
            .in_dir(dir.path())
            .with_env("PAINLESS_TEST", "set");
        let out = SystemRunner.run(&inv).unwrap();
        let lines: Vec<&str> = out.stdout.lines().collect();
        let reported = std::fs::canonicalize(lines[0]).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
        assert_eq!(lines[1], "set");
    }
}
