//! Project scaffolding from a template repository.

use std::path::{Path, PathBuf};

use painless_core::manifest::validate_dependency_name;
use painless_core::{normalize_source, probe, CoreError, Manifest};

use crate::error::Result;
use crate::process::{Invocation, ProcessRunner};
use crate::toolchain::Tools;

/// Clone `template` into `parent_dir/<name>` and make it a fresh project
/// called `name`.
///
/// The template's own `package.json` (if any) is renamed to `name` and its
/// `.git` directory is removed, so the result starts without history.
pub fn create_from_template(
    template: &str,
    name: &str,
    parent_dir: &Path,
    tools: &Tools,
    runner: &dyn ProcessRunner,
) -> Result<PathBuf> {
    validate_dependency_name(name)?;
    if template.trim().is_empty() {
        return Err(CoreError::MissingField { field: "template" }.into());
    }

    let target = parent_dir.join(name);
    if probe::exists(&target)? {
        return Err(CoreError::AlreadyExists { path: target }.into());
    }

    let source = normalize_source(template);
    tracing::info!(template = %source, target = %target.display(), "cloning template");
    let clone = Invocation::new(
        tools.git.as_str(),
        [
            "clone".to_string(),
            source,
            target.to_string_lossy().into_owned(),
        ],
    )
    .in_dir(parent_dir);
    runner.run(&clone)?;

    if !runner.executes() {
        return Ok(target);
    }

    if Manifest::exists_in(&target)? {
        let mut manifest = Manifest::load(&target)?;
        manifest.name = name.to_string();
        manifest.persist(&target)?;
    }
    if probe::remove_dir(&target.join(".git"))? {
        tracing::debug!(target = %target.display(), "removed template history");
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::process::DryRunRunner;
    use crate::testing::{tools, ScriptedRunner};

    const TEMPLATE: &str = r#"{"Name":"template","Version":"0.3.0","Packages":{"util":{"Uri":"https://git.internal/util.git","Private":true}}}"#;

    #[test]
    fn renames_manifest_and_drops_history() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();
        runner.with_nested_manifest("https://git.internal/templates/service.git", TEMPLATE);

        let target = create_from_template(
            "git.internal/templates/service",
            "billing",
            dir.path(),
            &tools(),
            &runner,
        )
        .unwrap();

        assert_eq!(target, dir.path().join("billing"));
        assert!(!target.join(".git").exists());
        let manifest = Manifest::load(&target).unwrap();
        assert_eq!(manifest.name, "billing");
        assert_eq!(manifest.version, "0.3.0");
        assert!(manifest.dependencies.contains_key("util"));
    }

    #[test]
    fn template_without_manifest_is_still_created() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();

        let target =
            create_from_template("git@host:t/plain.git", "plain", dir.path(), &tools(), &runner)
                .unwrap();

        assert!(target.join("main.go").is_file());
        assert!(!Manifest::exists_in(&target).unwrap());
        assert_eq!(runner.calls()[0].args[1], "git@host:t/plain.git");
    }

    #[test]
    fn existing_target_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("taken")).unwrap();
        let runner = ScriptedRunner::new();

        let err = create_from_template("git.internal/t", "taken", dir.path(), &tools(), &runner)
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Core(CoreError::AlreadyExists { .. })
        ));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn failed_clone_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();
        runner.fail_on("git", "clone");

        let err = create_from_template("git.internal/t", "svc", dir.path(), &tools(), &runner)
            .unwrap_err();
        assert!(matches!(err, ResolveError::FetchFailure { .. }));
    }

    #[test]
    fn dry_run_only_prints_clone() {
        let dir = tempfile::tempdir().unwrap();
        let runner = DryRunRunner::new();

        let target =
            create_from_template("git.internal/t", "svc", dir.path(), &tools(), &runner).unwrap();
        assert!(!target.exists());
        assert_eq!(runner.invocations().len(), 1);
    }
}
