//! `painless create`: start a project from a template repository.

use std::path::Path;

use anyhow::{Context, Result};
use painless_resolve::create_from_template;

use super::Session;

pub fn run(parent_dir: &Path, template: &str, name: &str, session: &Session<'_>) -> Result<()> {
    let target = create_from_template(template, name, parent_dir, &session.tools, session.runner)
        .with_context(|| format!("creating '{name}' from template {template}"))?;
    if !session.dry_run() {
        println!("Created project '{name}' in {}", target.display());
    }
    Ok(())
}
