//! `painless remove`: drop one dependency.

use std::path::Path;

use anyhow::{Context, Result};
use painless_resolve::Resolver;

use super::Session;

/// Remove `name` and rewrite the project. Returns whether it was declared.
pub fn run(project_dir: &Path, name: &str, session: &Session<'_>) -> Result<bool> {
    let mut resolver =
        Resolver::load(project_dir, session.environment()).context("loading package.json")?;
    let removed = resolver.remove(name);
    session.write(&resolver)?;

    if removed {
        println!("Removed dependency '{name}'");
    } else {
        println!("'{name}' is not a dependency");
    }
    Ok(removed)
}
