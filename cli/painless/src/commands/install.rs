//! `painless install`: add one dependency.

use std::path::Path;

use anyhow::{Context, Result};
use painless_resolve::{AddOptions, Resolver};

use super::Session;

pub fn run(
    project_dir: &Path,
    url: &str,
    name: &str,
    options: AddOptions,
    session: &Session<'_>,
) -> Result<()> {
    let mut resolver = Resolver::load(project_dir, session.environment())
        .context("loading package.json (run `painless init` first)")?;
    resolver
        .add(url, name, options)
        .with_context(|| format!("installing '{name}' from {url}"))?;
    session.write(&resolver)?;

    let kind = if options.private { "private" } else { "public" };
    println!("Added {kind} dependency '{name}'");
    Ok(())
}
