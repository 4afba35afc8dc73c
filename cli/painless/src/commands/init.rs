//! `painless init`: create a manifest and a module descriptor.

use std::path::Path;

use anyhow::{Context, Result};
use painless_core::{probe, Manifest, DESCRIPTOR_FILE, MANIFEST_FILE};

use super::Session;

/// Create `package.json` in `project_dir`, then `go mod init <name>` unless
/// a `go.mod` is already there.
pub fn run(project_dir: &Path, name: &str, version: &str, session: &Session<'_>) -> Result<()> {
    if session.dry_run() {
        Manifest::new(name, version)?;
        println!("would create {MANIFEST_FILE} for '{name}' {version}");
    } else {
        Manifest::create(project_dir, name, version)
            .with_context(|| format!("initializing {}", project_dir.display()))?;
        println!("Created {MANIFEST_FILE} for '{name}' {version}");
    }

    if !probe::exists(&project_dir.join(DESCRIPTOR_FILE))? {
        session.toolchain().mod_init_lenient(name, project_dir);
    }
    Ok(())
}
