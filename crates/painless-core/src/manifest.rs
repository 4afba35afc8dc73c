//! `package.json` manifest store.
//!
//! The manifest is fully owned by painless: every write replaces the whole
//! file. The JSON shape keeps the capitalised keys of existing manifests:
//!
//! ```text
//! {
//! 	"Name": "billing",
//! 	"Version": "1.0.0",
//! 	"Packages": {
//! 		"github.com/acme/auth": { "Uri": "https://github.com/acme/auth.git", "Private": true }
//! 	}
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, Result};
use crate::probe;

/// File name of the manifest inside a project directory.
pub const MANIFEST_FILE: &str = "package.json";

/// A project's dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Project name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Project version.
    #[serde(rename = "Version")]
    pub version: String,
    /// Dependency name → record.
    #[serde(
        rename = "Packages",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub dependencies: BTreeMap<String, DependencyRecord>,
}

/// One declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Where the dependency is fetched from.
    #[serde(rename = "Uri")]
    pub uri: String,
    /// Private dependencies are cloned into the shared cache; public ones go
    /// through `go get`.
    #[serde(rename = "Private", default)]
    pub private: bool,
}

/// Older manifests were written with `"Packages": null`.
fn null_as_empty<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, DependencyRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let packages = Option::<BTreeMap<String, DependencyRecord>>::deserialize(deserializer)?;
    Ok(packages.unwrap_or_default())
}

impl Manifest {
    /// Build an in-memory manifest with no dependencies.
    pub fn new(name: &str, version: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(CoreError::MissingField { field: "name" });
        }
        if version.trim().is_empty() {
            return Err(CoreError::MissingField { field: "version" });
        }
        Ok(Manifest {
            name: name.to_string(),
            version: version.to_string(),
            dependencies: BTreeMap::new(),
        })
    }

    /// Path of the manifest file inside `project_dir`.
    pub fn path(project_dir: &Path) -> PathBuf {
        project_dir.join(MANIFEST_FILE)
    }

    /// Check whether `project_dir` carries a manifest.
    pub fn exists_in(project_dir: &Path) -> Result<bool> {
        probe::exists(&Self::path(project_dir))
    }

    /// Create and persist a fresh manifest.
    ///
    /// Fails with [`CoreError::AlreadyExists`] rather than overwriting an
    /// existing manifest.
    pub fn create(project_dir: &Path, name: &str, version: &str) -> Result<Self> {
        let path = Self::path(project_dir);
        if probe::exists(&path)? {
            return Err(CoreError::AlreadyExists { path });
        }
        let manifest = Self::new(name, version)?;
        manifest.persist(project_dir)?;
        tracing::debug!(path = %path.display(), "created manifest");
        Ok(manifest)
    }

    /// Load the manifest from `project_dir`.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = Self::path(project_dir);
        let content = probe::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|source| CoreError::ManifestParse { path, source })
    }

    /// Parse a manifest from a JSON string.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Serialize to tab-indented JSON.
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the whole manifest to `project_dir`, replacing the file.
    pub fn persist(&self, project_dir: &Path) -> Result<()> {
        probe::write(&Self::path(project_dir), &self.to_json()?)
    }

    /// Iterate over the private dependencies, sorted by name.
    pub fn private_dependencies(&self) -> impl Iterator<Item = (&str, &DependencyRecord)> {
        self.dependencies
            .iter()
            .filter(|(_, record)| record.private)
            .map(|(name, record)| (name.as_str(), record))
    }
}

/// Reject names that cannot double as a Go module path and cache key.
pub fn validate_dependency_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| CoreError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(CoreError::MissingField { field: "name" });
    }
    if name.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\') {
        return Err(invalid("contains whitespace, quotes, or backslashes"));
    }
    let path = Path::new(name);
    if path.is_absolute() {
        return Err(invalid("must be relative"));
    }
    if path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(invalid("must not contain '.' or '..' segments"));
    }
    Ok(())
}
