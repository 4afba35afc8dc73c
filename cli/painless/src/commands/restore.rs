//! `painless restore`: fetch every declared dependency.
//!
//! Also the entry point of nested restores, where the parent process passes
//! its restore chain through `--chain`.

use std::path::Path;

use anyhow::{Context, Result};
use painless_resolve::{Resolver, RestoreChain, RestoreSummary};

use super::Session;

/// Flags for `painless restore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOptions {
    pub update: bool,
    pub tidy: bool,
    pub recursive: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        RestoreOptions {
            update: false,
            tidy: false,
            recursive: true,
        }
    }
}

pub fn run(
    project_dir: &Path,
    options: RestoreOptions,
    chain: RestoreChain,
    session: &Session<'_>,
) -> Result<RestoreSummary> {
    let resolver = Resolver::load(project_dir, session.environment())
        .with_context(|| format!("loading package.json in {}", project_dir.display()))?
        .with_chain(chain);

    let summary = resolver.restore_all(options.recursive, options.update)?;
    session.write(&resolver)?;
    if options.tidy {
        session.toolchain().mod_tidy(project_dir)?;
    }

    println!(
        "Restored {} of '{}' ({} public, {} cloned, {} cached)",
        plural(summary.public + summary.cloned + summary.reused, "dependency", "dependencies"),
        resolver.manifest().name,
        summary.public,
        summary.cloned,
        summary.reused,
    );
    Ok(summary)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{session, FakeRunner};
    use painless_core::{DependencyRecord, Manifest, DESCRIPTOR_FILE};

    fn project(root: &Path) {
        let mut manifest = Manifest::new("app", "1.0.0").unwrap();
        manifest.dependencies.insert(
            "github.com/google/uuid".to_string(),
            DependencyRecord {
                uri: "github.com/google/uuid".to_string(),
                private: false,
            },
        );
        manifest.dependencies.insert(
            "tools".to_string(),
            DependencyRecord {
                uri: "https://git.internal/tools.git".to_string(),
                private: true,
            },
        );
        manifest.persist(root).unwrap();
    }

    #[test]
    fn restore_initialises_fetches_and_reconciles() {
        let root = tempfile::tempdir().unwrap();
        project(root.path());
        // Stands in for `go mod init`, which the fake runner does not perform.
        std::fs::write(root.path().join(DESCRIPTOR_FILE), "module app\n").unwrap();
        let runner = FakeRunner::default();
        let session = session(root.path(), &runner);

        let summary = run(
            root.path(),
            RestoreOptions::default(),
            RestoreChain::default(),
            &session,
        )
        .unwrap();

        assert_eq!(summary.public, 1);
        assert_eq!(summary.cloned, 1);
        let go_mod = std::fs::read_to_string(root.path().join(DESCRIPTOR_FILE)).unwrap();
        assert!(go_mod.contains("require tools v1.0.0"));
        assert!(runner
            .command_lines()
            .contains(&"go get github.com/google/uuid".to_string()));
    }

    #[test]
    fn tidy_runs_in_project_after_write() {
        let root = tempfile::tempdir().unwrap();
        project(root.path());
        std::fs::write(root.path().join(DESCRIPTOR_FILE), "module app\n").unwrap();
        let runner = FakeRunner::default();
        let options = RestoreOptions {
            tidy: true,
            ..RestoreOptions::default()
        };

        run(root.path(), options, RestoreChain::default(), &session(root.path(), &runner))
            .unwrap();

        let last = runner.calls().pop().unwrap();
        assert_eq!(last.command_line(), "go mod tidy");
        assert_eq!(last.cwd.as_deref(), Some(root.path()));
    }

    #[test]
    fn inherited_chain_is_honoured() {
        let root = tempfile::tempdir().unwrap();
        project(root.path());
        std::fs::write(root.path().join(DESCRIPTOR_FILE), "module app\n").unwrap();
        let runner = FakeRunner::default();
        let session = session(root.path(), &runner);

        // Seed the cache entry with its own manifest so restore recurses.
        let entry = session.cache.entry_dir("tools", "git.internal/tools");
        std::fs::create_dir_all(&entry).unwrap();
        Manifest::new("tools", "1.0.0").unwrap().persist(&entry).unwrap();

        let chain = RestoreChain::from_names(vec!["tools".to_string(), "app".to_string()]);
        let err = run(root.path(), RestoreOptions::default(), chain, &session).unwrap_err();
        assert!(format!("{err:#}").contains("tools -> app -> tools"));
    }
}
