//! Add, remove, and restore over a project's manifest.
//!
//! A [`Resolver`] owns the manifest for one command invocation. Operations
//! change that value in memory; nothing reaches disk until [`Resolver::write`]
//! reconciles `go.mod` and persists `package.json`. A failed fetch therefore
//! never leaves a half-updated record behind.

use std::path::{Path, PathBuf};

use painless_core::manifest::validate_dependency_name;
use painless_core::{
    normalize_source, probe, write_project, CoreError, DependencyRecord, Manifest, PackageCache,
    DESCRIPTOR_FILE,
};

use crate::chain::RestoreChain;
use crate::error::{ResolveError, Result};
use crate::fetch::{FetchOutcome, PrivateFetcher};
use crate::process::ProcessRunner;
use crate::toolchain::{GoToolchain, Tools};

/// Where dependencies go and how external commands run.
pub struct Environment<'r> {
    pub cache: PackageCache,
    pub tools: Tools,
    pub runner: &'r dyn ProcessRunner,
}

/// Flags for [`Resolver::add`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Clone into the shared cache instead of `go get`.
    pub private: bool,
    /// Replace an existing declaration and re-clone.
    pub update: bool,
    /// Restore the dependency's own `package.json`.
    pub recursive: bool,
}

/// Counts reported by [`Resolver::restore_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Public dependencies fetched through `go get`.
    pub public: usize,
    /// Private dependencies cloned fresh.
    pub cloned: usize,
    /// Private dependencies already in the cache.
    pub reused: usize,
}

/// Applies dependency operations to one project.
pub struct Resolver<'r> {
    project_dir: PathBuf,
    manifest: Manifest,
    env: Environment<'r>,
    chain: RestoreChain,
}

impl<'r> Resolver<'r> {
    /// Wrap an already loaded manifest.
    pub fn new(project_dir: &Path, manifest: Manifest, env: Environment<'r>) -> Self {
        let chain = RestoreChain::root(&manifest.name);
        Resolver {
            project_dir: project_dir.to_path_buf(),
            manifest,
            env,
            chain,
        }
    }

    /// Load `package.json` from `project_dir`.
    pub fn load(project_dir: &Path, env: Environment<'r>) -> Result<Self> {
        let manifest = Manifest::load(project_dir)?;
        Ok(Self::new(project_dir, manifest, env))
    }

    /// Continue a restore chain handed down by a parent process.
    pub fn with_chain(mut self, chain: RestoreChain) -> Self {
        if !chain.names().is_empty() {
            self.chain = chain;
        }
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn into_manifest(self) -> Manifest {
        self.manifest
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn cache(&self) -> &PackageCache {
        &self.env.cache
    }

    /// Fetch a dependency and declare it under `name`.
    ///
    /// The record is written only after the fetch succeeds. Private sources
    /// are stored normalized.
    pub fn add(&mut self, uri: &str, name: &str, options: AddOptions) -> Result<()> {
        validate_dependency_name(name)?;
        if uri.trim().is_empty() {
            return Err(CoreError::MissingField { field: "url" }.into());
        }
        if self.manifest.dependencies.contains_key(name) && !options.update {
            return Err(ResolveError::DuplicateDependency {
                name: name.to_string(),
            });
        }

        let uri = if options.private {
            self.fetcher()
                .fetch(uri, name, options.recursive, options.update, &self.chain)?;
            normalize_source(uri)
        } else {
            self.toolchain().get(uri, &self.project_dir)?;
            uri.to_string()
        };

        tracing::info!(name, uri = %uri, private = options.private, "declared dependency");
        self.manifest.dependencies.insert(
            name.to_string(),
            DependencyRecord {
                uri,
                private: options.private,
            },
        );
        Ok(())
    }

    /// Drop a declaration. Returns whether `name` was declared.
    ///
    /// The cache entry stays; the next write removes the `go.mod` entries.
    pub fn remove(&mut self, name: &str) -> bool {
        self.manifest.dependencies.remove(name).is_some()
    }

    /// Fetch every declared dependency again.
    ///
    /// Private dependencies that ship their own `package.json` are restored
    /// in place (when `recursive`) and tidied with `go mod tidy`.
    pub fn restore_all(&self, recursive: bool, update: bool) -> Result<RestoreSummary> {
        self.ensure_descriptor()?;

        let mut summary = RestoreSummary::default();
        for (name, record) in &self.manifest.dependencies {
            if !record.private {
                self.toolchain().get(&record.uri, &self.project_dir)?;
                summary.public += 1;
                continue;
            }

            let fetcher = self.fetcher();
            let outcome = fetcher.fetch(&record.uri, name, recursive, update, &self.chain)?;
            match outcome {
                FetchOutcome::Cloned { .. } => summary.cloned += 1,
                FetchOutcome::Reused { .. } => summary.reused += 1,
            }
            if recursive
                && !outcome.nested_restored()
                && self.env.runner.executes()
                && Manifest::exists_in(outcome.path())?
            {
                fetcher.restore_nested(name, outcome.path(), update, &self.chain)?;
            }

            if let Err(e) = self.toolchain().mod_tidy(outcome.path()) {
                tracing::warn!(name = %name, "go mod tidy failed: {e}");
            }
        }

        tracing::info!(
            public = summary.public,
            cloned = summary.cloned,
            reused = summary.reused,
            "restore finished"
        );
        Ok(summary)
    }

    /// Reconcile `go.mod` and persist `package.json`.
    pub fn write(&self) -> Result<()> {
        write_project(&self.project_dir, &self.manifest, &self.env.cache)?;
        Ok(())
    }

    /// Run `go mod init` for the project when it has no `go.mod` yet.
    fn ensure_descriptor(&self) -> Result<()> {
        if !probe::exists(&self.project_dir.join(DESCRIPTOR_FILE))? {
            self.toolchain()
                .mod_init_lenient(&self.manifest.name, &self.project_dir);
        }
        Ok(())
    }

    fn fetcher(&self) -> PrivateFetcher<'_> {
        PrivateFetcher::new(&self.env.cache, &self.env.tools, self.env.runner)
    }

    fn toolchain(&self) -> GoToolchain<'_> {
        GoToolchain::new(&self.env.tools, self.env.runner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tools, ScriptedRunner};

    struct Project {
        dir: tempfile::TempDir,
        cache_root: PathBuf,
    }

    impl Project {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let project = dir.path().join("app");
            std::fs::create_dir_all(&project).unwrap();
            Manifest::create(&project, "github.com/acme/app", "1.0.0").unwrap();
            std::fs::write(
                project.join(DESCRIPTOR_FILE),
                "module github.com/acme/app\n\ngo 1.22\n",
            )
            .unwrap();
            let cache_root = dir.path().join("packages");
            Project { dir, cache_root }
        }

        fn path(&self) -> PathBuf {
            self.dir.path().join("app")
        }

        fn resolver<'r>(&self, runner: &'r ScriptedRunner) -> Resolver<'r> {
            let env = Environment {
                cache: PackageCache::new(self.cache_root.clone()),
                tools: tools(),
                runner,
            };
            Resolver::load(&self.path(), env).unwrap()
        }
    }

    const PUBLIC: AddOptions = AddOptions {
        private: false,
        update: false,
        recursive: false,
    };

    const PRIVATE: AddOptions = AddOptions {
        private: true,
        update: false,
        recursive: true,
    };

    #[test]
    fn add_then_remove_restores_prior_mapping() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        let mut resolver = project.resolver(&runner);
        let before = resolver.manifest().dependencies.clone();

        resolver.add("github.com/google/uuid", "uuid", PUBLIC).unwrap();
        assert!(resolver.manifest().dependencies.contains_key("uuid"));
        assert!(resolver.remove("uuid"));
        assert!(!resolver.remove("uuid"));

        assert_eq!(resolver.manifest().dependencies, before);
        assert_eq!(runner.count("go", "get"), 1);
    }

    #[test]
    fn duplicate_add_is_rejected_and_record_kept() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        let mut resolver = project.resolver(&runner);

        resolver.add("github.com/google/uuid", "foo", PUBLIC).unwrap();
        let first = resolver.manifest().dependencies["foo"].clone();

        let err = resolver.add("github.com/other/uuid", "foo", PUBLIC).unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateDependency { ref name } if name == "foo"));
        assert_eq!(resolver.manifest().dependencies["foo"], first);
        assert_eq!(runner.count("go", "get"), 1);
    }

    #[test]
    fn duplicate_private_add_does_not_clone_again() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        let mut resolver = project.resolver(&runner);

        resolver.add("git.internal/lib", "lib", PRIVATE).unwrap();
        let first = resolver.manifest().dependencies["lib"].clone();

        let err = resolver.add("git.internal/other", "lib", PRIVATE).unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateDependency { ref name } if name == "lib"));
        assert_eq!(resolver.manifest().dependencies["lib"], first);
        assert_eq!(runner.count("git", "clone"), 1);
    }

    #[test]
    fn update_replaces_existing_record() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        let mut resolver = project.resolver(&runner);

        resolver.add("github.com/google/uuid", "foo", PUBLIC).unwrap();
        let update = AddOptions {
            update: true,
            ..PUBLIC
        };
        resolver.add("github.com/gofrs/uuid", "foo", update).unwrap();
        assert_eq!(resolver.manifest().dependencies["foo"].uri, "github.com/gofrs/uuid");
    }

    #[test]
    fn private_add_stores_normalized_uri() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        let mut resolver = project.resolver(&runner);

        resolver.add("git.internal/lib", "lib", PRIVATE).unwrap();

        let record = &resolver.manifest().dependencies["lib"];
        assert!(record.private);
        assert_eq!(record.uri, "https://git.internal/lib.git");
        assert!(resolver.cache().contains("lib", &record.uri).unwrap());
    }

    #[test]
    fn failed_clone_leaves_record_absent() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        runner.fail_on("git", "clone");
        let mut resolver = project.resolver(&runner);

        let err = resolver.add("git.internal/lib", "lib", PRIVATE).unwrap_err();
        assert!(matches!(err, ResolveError::FetchFailure { .. }));
        assert!(!resolver.manifest().dependencies.contains_key("lib"));
    }

    #[test]
    fn failed_update_keeps_prior_record() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        let mut resolver = project.resolver(&runner);
        resolver.add("git.internal/lib", "lib", PRIVATE).unwrap();
        let before = resolver.manifest().dependencies["lib"].clone();

        runner.fail_on("git", "clone");
        let update = AddOptions {
            update: true,
            ..PRIVATE
        };
        assert!(resolver.add("git.internal/lib-v2", "lib", update).is_err());
        assert_eq!(resolver.manifest().dependencies["lib"], before);
    }

    #[test]
    fn invalid_input_has_no_side_effects() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        let mut resolver = project.resolver(&runner);

        assert!(resolver.add("", "lib", PRIVATE).is_err());
        assert!(resolver.add("git.internal/lib", "../lib", PRIVATE).is_err());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn write_reconciles_descriptor_and_manifest() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        let mut resolver = project.resolver(&runner);
        resolver.add("git.internal/lib", "lib", PRIVATE).unwrap();
        resolver.add("github.com/google/uuid", "github.com/google/uuid", PUBLIC).unwrap();
        resolver.write().unwrap();

        let go_mod = std::fs::read_to_string(project.path().join(DESCRIPTOR_FILE)).unwrap();
        let entry = resolver.cache().entry_dir("lib", "git.internal/lib");
        assert!(go_mod.contains(&format!("replace lib => \"{}\"", entry.display())));
        assert!(go_mod.contains("require lib v1.0.0"));
        assert!(!go_mod.contains("replace github.com/google/uuid"));

        let saved = Manifest::load(&project.path()).unwrap();
        assert_eq!(&saved, resolver.manifest());

        // Removal is reflected on the next write.
        assert!(resolver.remove("lib"));
        resolver.write().unwrap();
        let go_mod = std::fs::read_to_string(project.path().join(DESCRIPTOR_FILE)).unwrap();
        assert!(!go_mod.contains("replace lib"));
        assert!(!go_mod.contains("require lib"));
        assert!(entry.is_dir());
    }

    #[test]
    fn restore_fetches_everything_and_reuses_cache() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        let mut resolver = project.resolver(&runner);
        resolver.add("git.internal/lib", "lib", PRIVATE).unwrap();
        resolver.add("github.com/google/uuid", "uuid", PUBLIC).unwrap();

        let summary = resolver.restore_all(true, false).unwrap();
        assert_eq!(
            summary,
            RestoreSummary {
                public: 1,
                cloned: 0,
                reused: 1
            }
        );
        assert_eq!(runner.count("git", "clone"), 1);
        assert_eq!(runner.count("go", "get"), 2);

        let tidy = runner
            .calls()
            .into_iter()
            .find(|c| c.command_line() == "go mod tidy")
            .unwrap();
        assert_eq!(
            tidy.cwd.as_deref(),
            Some(resolver.cache().entry_dir("lib", "git.internal/lib").as_path())
        );
    }

    #[test]
    fn restore_with_update_reclones() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        let mut resolver = project.resolver(&runner);
        resolver.add("git.internal/lib", "lib", PRIVATE).unwrap();

        let summary = resolver.restore_all(true, true).unwrap();
        assert_eq!(summary.cloned, 1);
        assert_eq!(runner.count("git", "clone"), 2);
    }

    #[test]
    fn restore_runs_nested_restore_for_cached_manifest() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        runner.with_nested_manifest(
            "https://git.internal/lib.git",
            r#"{"Name":"lib","Version":"1.0.0","Packages":{}}"#,
        );
        let mut resolver = project.resolver(&runner);
        let non_recursive = AddOptions {
            recursive: false,
            ..PRIVATE
        };
        resolver.add("git.internal/lib", "lib", non_recursive).unwrap();
        assert_eq!(runner.count("/usr/local/bin/painless", "restore"), 0);

        resolver.restore_all(true, false).unwrap();
        assert_eq!(runner.count("/usr/local/bin/painless", "restore"), 1);

        resolver.restore_all(false, false).unwrap();
        assert_eq!(runner.count("/usr/local/bin/painless", "restore"), 1);
    }

    #[test]
    fn fresh_clone_during_restore_is_not_restored_twice() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        runner.with_nested_manifest(
            "https://git.internal/lib.git",
            r#"{"Name":"lib","Version":"1.0.0","Packages":{}}"#,
        );
        let mut resolver = project.resolver(&runner);
        resolver.add("git.internal/lib", "lib", PRIVATE).unwrap();
        assert_eq!(runner.count("/usr/local/bin/painless", "restore"), 1);

        resolver.restore_all(true, true).unwrap();
        assert_eq!(runner.count("/usr/local/bin/painless", "restore"), 2);
    }

    #[test]
    fn restore_initialises_missing_descriptor() {
        let project = Project::new();
        std::fs::remove_file(project.path().join(DESCRIPTOR_FILE)).unwrap();
        let runner = ScriptedRunner::new();
        let resolver = project.resolver(&runner);

        resolver.restore_all(true, false).unwrap();
        let init = &runner.calls()[0];
        assert_eq!(init.command_line(), "go mod init github.com/acme/app");
        assert_eq!(init.cwd.as_deref(), Some(project.path().as_path()));
    }

    #[test]
    fn restore_stops_at_first_public_failure() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        let mut resolver = project.resolver(&runner);
        resolver.add("github.com/google/uuid", "uuid", PUBLIC).unwrap();

        runner.fail_on("go", "get");
        assert!(matches!(
            resolver.restore_all(true, false),
            Err(ResolveError::FetchFailure { .. })
        ));
        runner.clear_failures();
        assert!(resolver.restore_all(true, false).is_ok());
    }

    #[test]
    fn inherited_chain_blocks_cycles() {
        let project = Project::new();
        let runner = ScriptedRunner::new();
        runner.with_nested_manifest(
            "https://git.internal/lib.git",
            r#"{"Name":"lib","Version":"1.0.0","Packages":{}}"#,
        );
        let mut resolver = project
            .resolver(&runner)
            .with_chain(RestoreChain::from_names(vec![
                "lib".to_string(),
                "github.com/acme/app".to_string(),
            ]));

        let err = resolver.add("git.internal/lib", "lib", PRIVATE).unwrap_err();
        assert!(matches!(err, ResolveError::CyclicDependency { .. }));
        assert!(!resolver.manifest().dependencies.contains_key("lib"));
    }
}
