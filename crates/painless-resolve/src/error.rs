//! Resolver error types.

use painless_core::CoreError;

/// Errors that can occur while fetching or resolving dependencies.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The dependency is already declared and no update was requested.
    #[error("dependency '{name}' already exists (pass --update to replace it)")]
    DuplicateDependency { name: String },

    /// An external command exited unsuccessfully.
    #[error("`{command}` failed ({}): {}", describe_exit(exit_code), stderr.trim())]
    FetchFailure {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// An external command could not be started at all.
    #[error("could not run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A nested restore would re-enter a dependency already being restored.
    #[error("cyclic private dependency: {}", chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    /// Manifest, cache, or descriptor error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
