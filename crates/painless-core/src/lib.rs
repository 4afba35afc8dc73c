//! Core data model for painless, a private-repository package manager for Go.
//!
//! painless keeps two files in step inside a project directory:
//!
//! - **`package.json`**, the manifest this tool owns, with the project name,
//!   version, and a map of dependencies declared by version-control URL.
//! - **`go.mod`**, the module descriptor owned by the Go toolchain. painless
//!   only ever touches the `replace`/`require` entries it manages there.
//!
//! Private dependencies are cloned into a shared cache and redirected to with
//! `replace` directives. This crate holds the pieces that need no subprocess:
//! the manifest store, the cache layout, the filesystem probe, the `go.mod`
//! grammar, and the reconciler that rewrites it.

pub mod cache;
pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod probe;
pub mod reconcile;

// Re-exports for convenience.
pub use cache::{normalize_source, CacheEntry, PackageCache};
pub use descriptor::{Entry, EntryKind, ModuleDescriptor, DESCRIPTOR_FILE};
pub use error::{CoreError, Result};
pub use manifest::{DependencyRecord, Manifest, MANIFEST_FILE};
pub use reconcile::{reconcile, write_project, PLACEHOLDER_VERSION};
