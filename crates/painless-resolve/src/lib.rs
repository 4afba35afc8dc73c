//! Dependency fetching and resolution for painless.
//!
//! Everything that talks to the outside world lives here: the process runner
//! behind every `git`/`go` invocation, the private fetcher that clones into
//! the shared cache, and the [`Resolver`] that applies add, remove, and
//! restore to a project's manifest before handing it to the reconciler.
//!
//! All work is synchronous and sequential. A nested restore runs this same
//! binary as a child process inside the dependency's working copy and blocks
//! until it exits.

pub mod chain;
pub mod error;
pub mod fetch;
pub mod process;
pub mod resolver;
pub mod template;
pub mod toolchain;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience.
pub use chain::RestoreChain;
pub use error::{ResolveError, Result};
pub use fetch::{FetchOutcome, PrivateFetcher};
pub use process::{Captured, DryRunRunner, Invocation, ProcessRunner, SystemRunner};
pub use resolver::{AddOptions, Environment, Resolver, RestoreSummary};
pub use template::create_from_template;
pub use toolchain::{GoToolchain, Tools};
