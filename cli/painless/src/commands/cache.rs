//! `painless cache`: inspect and prune the shared cache.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use painless_core::{probe, CacheEntry, Manifest, PackageCache};

use super::Session;

/// Print every working copy in the cache.
pub fn list(session: &Session<'_>) -> Result<Vec<CacheEntry>> {
    let entries = session.cache.list_entries()?;
    if entries.is_empty() {
        println!("Cache at {} is empty", session.cache.root().display());
    }
    for entry in &entries {
        println!("{}", entry.key);
    }
    Ok(entries)
}

/// Remove cache entries this project does not reach. Returns the removed
/// entry keys.
///
/// An entry is kept when it belongs to a private dependency of the manifest
/// in `project_dir`, or to a private dependency declared by the `package.json`
/// of another kept entry. Entries used only by other projects are removed.
pub fn prune(project_dir: &Path, session: &Session<'_>) -> Result<Vec<String>> {
    let manifest = Manifest::load(project_dir).context("loading package.json")?;
    let referenced = reachable_entries(&manifest, &session.cache)?;

    let mut pruned = Vec::new();
    for entry in session.cache.list_entries()? {
        if referenced.contains(&entry.key) {
            continue;
        }
        if session.dry_run() {
            println!("would remove {}", entry.key);
        } else {
            probe::remove_dir(&entry.path)?;
            println!("Removed {}", entry.key);
        }
        pruned.push(entry.key);
    }
    tracing::info!(kept = referenced.len(), pruned = pruned.len(), "pruned cache");
    Ok(pruned)
}

/// Keys of every entry reachable from the private dependencies of `manifest`.
fn reachable_entries(manifest: &Manifest, cache: &PackageCache) -> Result<BTreeSet<String>> {
    let mut pending: Vec<(String, String)> = private_sources(manifest);
    let mut reached = BTreeSet::new();
    while let Some((name, uri)) = pending.pop() {
        if !reached.insert(PackageCache::entry_key(&name, &uri)) {
            continue;
        }
        let entry = cache.entry_dir(&name, &uri);
        if !Manifest::exists_in(&entry)? {
            continue;
        }
        match Manifest::load(&entry) {
            Ok(nested) => pending.extend(private_sources(&nested)),
            Err(e) => tracing::warn!(entry = %entry.display(), error = %e, "skipping unreadable package.json"),
        }
    }
    Ok(reached)
}

fn private_sources(manifest: &Manifest) -> Vec<(String, String)> {
    manifest
        .private_dependencies()
        .map(|(name, record)| (name.to_string(), record.uri.clone()))
        .collect()
}
