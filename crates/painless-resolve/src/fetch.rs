//! Private dependency fetcher.
//!
//! Clones a dependency into the shared cache with `git clone`, relying on the
//! user's git credentials for private repositories. When the clone carries a
//! `package.json` of its own and recursion is requested, its dependencies are
//! restored by running this binary's `restore` inside the working copy.

use std::path::{Path, PathBuf};

use painless_core::{normalize_source, probe, Manifest, PackageCache};

use crate::chain::RestoreChain;
use crate::error::{ResolveError, Result};
use crate::process::{Invocation, ProcessRunner};
use crate::toolchain::{GoToolchain, Tools};

/// What a fetch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The working copy was already cached and left untouched.
    Reused { path: PathBuf },
    /// A fresh clone was made.
    Cloned {
        path: PathBuf,
        /// Whether the clone's own dependencies were restored as part of
        /// the fetch.
        nested_restored: bool,
    },
}

impl FetchOutcome {
    /// The working copy in the cache.
    pub fn path(&self) -> &Path {
        match self {
            FetchOutcome::Reused { path } | FetchOutcome::Cloned { path, .. } => path,
        }
    }

    pub fn nested_restored(&self) -> bool {
        matches!(
            self,
            FetchOutcome::Cloned {
                nested_restored: true,
                ..
            }
        )
    }
}

/// Clones private dependencies into a [`PackageCache`].
pub struct PrivateFetcher<'r> {
    cache: &'r PackageCache,
    tools: &'r Tools,
    runner: &'r dyn ProcessRunner,
}

impl<'r> PrivateFetcher<'r> {
    pub fn new(cache: &'r PackageCache, tools: &'r Tools, runner: &'r dyn ProcessRunner) -> Self {
        PrivateFetcher {
            cache,
            tools,
            runner,
        }
    }

    /// Make sure `name` from `uri` is in the cache.
    ///
    /// An existing working copy is reused unless `update` is set, in which
    /// case it is deleted and cloned again. A failed clone is not cleaned up.
    pub fn fetch(
        &self,
        uri: &str,
        name: &str,
        recursive: bool,
        update: bool,
        chain: &RestoreChain,
    ) -> Result<FetchOutcome> {
        self.cache.ensure_root()?;

        let path = self.cache.entry_dir(name, uri);
        if probe::exists(&path)? {
            if !update {
                tracing::debug!(name, path = %path.display(), "using cached copy");
                return Ok(FetchOutcome::Reused { path });
            }
            self.cache.remove(name, uri)?;
        }

        let source = normalize_source(uri);
        tracing::info!(name, source = %source, "cloning");
        let clone = Invocation::new(
            self.tools.git.as_str(),
            [
                "clone".to_string(),
                source,
                path.to_string_lossy().into_owned(),
            ],
        )
        .in_dir(self.cache.root());
        self.runner.run(&clone)?;

        let nested_restored =
            recursive && self.runner.executes() && Manifest::exists_in(&path)?;
        if nested_restored {
            self.restore_nested(name, &path, update, chain)?;
        }

        Ok(FetchOutcome::Cloned {
            path,
            nested_restored,
        })
    }

    /// Restore the dependencies of the working copy at `dir` by running
    /// `painless restore` there, one level deeper in `chain`.
    pub fn restore_nested(
        &self,
        name: &str,
        dir: &Path,
        update: bool,
        chain: &RestoreChain,
    ) -> Result<()> {
        if chain.contains(name) {
            let mut cycle = chain.names().to_vec();
            cycle.push(name.to_string());
            return Err(ResolveError::CyclicDependency { chain: cycle });
        }

        GoToolchain::new(self.tools, self.runner).mod_init_lenient(name, dir);

        let mut args = vec!["restore".to_string()];
        if update {
            args.push("--update".to_string());
        }
        args.extend(chain.extended(name).to_args());

        tracing::info!(name, dir = %dir.display(), "restoring nested dependencies");
        let nested = Invocation::new(self.tools.self_exe.to_string_lossy(), args).in_dir(dir);
        self.runner.run(&nested)?;
        Ok(())
    }
}
