//! `painless publish`: cross-compile with `go build`.

use std::path::Path;

use anyhow::{Context, Result};

use super::Session;

/// Build `target` into `output` for `runtime`/`architecture`
/// (`GOOS`/`GOARCH`).
pub fn run(
    project_dir: &Path,
    runtime: &str,
    architecture: &str,
    output: &str,
    target: &str,
    session: &Session<'_>,
) -> Result<()> {
    session
        .toolchain()
        .build(project_dir, runtime, architecture, output, target)
        .with_context(|| format!("building {target} for {runtime}/{architecture}"))?;
    if !session.dry_run() {
        println!("Built {output} ({runtime}/{architecture})");
    }
    Ok(())
}
