//! Keeps `go.mod` in step with the manifest's private dependencies.
//!
//! After reconciliation the descriptor holds exactly one
//! `replace <name> => "<cache entry>"` and one `require <name> v1.0.0` per
//! private dependency, appended at the end of the file. Entries are matched
//! by exact module path, never by substring, and everything painless does not
//! manage is left as it was.
//!
//! Every entry for a current private dependency is rewritten. An identifier
//! that is no longer private but still has a `replace` into the shared cache
//! is stale: only that `replace` and its placeholder `require` are removed, so
//! a `require` written by `go get` after the dependency went public survives.

use std::collections::BTreeSet;
use std::path::Path;

use crate::cache::PackageCache;
use crate::descriptor::{Entry, EntryKind, ModuleDescriptor, DESCRIPTOR_FILE};
use crate::error::Result;
use crate::manifest::Manifest;
use crate::probe;

/// Version written on `require` lines for private dependencies. The
/// `replace` directive makes the actual version irrelevant to the toolchain.
pub const PLACEHOLDER_VERSION: &str = "v1.0.0";

/// Rewrite descriptor text for the current manifest.
pub fn reconcile(descriptor: &str, manifest: &Manifest, cache: &PackageCache) -> Result<String> {
    let mut doc = ModuleDescriptor::parse(descriptor)?;

    let private: BTreeSet<&str> = manifest.private_dependencies().map(|(name, _)| name).collect();
    let stale: BTreeSet<String> = doc
        .entries()
        .filter(|entry| is_cache_redirect(entry, cache))
        .filter(|entry| !private.contains(entry.identifier.as_str()))
        .map(|entry| entry.identifier.clone())
        .collect();

    let removed = doc.retain_entries(|entry| {
        if private.contains(entry.identifier.as_str()) {
            return false;
        }
        if !stale.contains(&entry.identifier) {
            return true;
        }
        match entry.kind {
            EntryKind::Redirect => !is_cache_redirect(entry, cache),
            EntryKind::Requirement => entry.payload != PLACEHOLDER_VERSION,
        }
    });
    doc.compact_blank_lines();

    let mut added = 0;
    for (name, record) in manifest.private_dependencies() {
        let path = cache.entry_dir(name, &record.uri);
        doc.push_blank();
        doc.push_entry(Entry::redirect(name, &path.to_string_lossy()));
        doc.push_entry(Entry::requirement(name, PLACEHOLDER_VERSION));
        added += 1;
    }

    tracing::debug!(removed, added, "reconciled go.mod entries");
    Ok(doc.render())
}

fn is_cache_redirect(entry: &Entry, cache: &PackageCache) -> bool {
    entry.kind == EntryKind::Redirect && cache.holds(Path::new(&entry.payload))
}

/// Write step shared by every resolver operation: reconcile `go.mod` in
/// `project_dir`, then persist the manifest.
///
/// The two files are written one after the other with no rollback; if the
/// manifest write fails the descriptor has already been updated.
pub fn write_project(project_dir: &Path, manifest: &Manifest, cache: &PackageCache) -> Result<()> {
    let descriptor_path = project_dir.join(DESCRIPTOR_FILE);
    let current = probe::read_to_string(&descriptor_path)?;
    let updated = reconcile(&current, manifest, cache)?;
    if updated != current {
        probe::write(&descriptor_path, &updated)?;
    }
    manifest.persist(project_dir)
}
