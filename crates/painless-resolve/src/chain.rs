//! Restore chain used to detect cycles between private dependencies.
//!
//! A nested restore runs in a child process, so the chain travels on the
//! child's command line as repeated `--chain <name>` arguments, outermost
//! project first.

/// Names currently being restored, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreChain {
    names: Vec<String>,
}

impl RestoreChain {
    /// A chain holding only the top-level project.
    pub fn root(project: &str) -> Self {
        RestoreChain {
            names: vec![project.to_string()],
        }
    }

    /// Rebuild a chain received from a parent process.
    pub fn from_names(names: Vec<String>) -> Self {
        RestoreChain { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// The chain one level deeper.
    pub fn extended(&self, name: &str) -> Self {
        let mut names = self.names.clone();
        names.push(name.to_string());
        RestoreChain { names }
    }

    /// Command-line arguments passing this chain to a child.
    pub fn to_args(&self) -> Vec<String> {
        self.names
            .iter()
            .flat_map(|name| ["--chain".to_string(), name.clone()])
            .collect()
    }
}
