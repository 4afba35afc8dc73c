//! `painless clean`: remove `go.mod` and `go.sum`.

use std::path::Path;

use anyhow::Result;
use painless_core::{probe, DESCRIPTOR_FILE};

use super::Session;

/// Checksum file the Go toolchain writes next to `go.mod`.
const CHECKSUM_FILE: &str = "go.sum";

pub fn run(project_dir: &Path, session: &Session<'_>) -> Result<()> {
    for file in [DESCRIPTOR_FILE, CHECKSUM_FILE] {
        let path = project_dir.join(file);
        if session.dry_run() {
            if probe::exists(&path)? {
                println!("would remove {}", path.display());
            }
        } else if probe::remove_file(&path)? {
            println!("Removed {}", path.display());
        } else {
            println!("Already clean: {} does not exist", path.display());
        }
    }
    Ok(())
}
