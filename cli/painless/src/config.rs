//! User configuration read from `$PAINLESS_HOME/config.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

use painless_core::{probe, PackageCache};
use painless_resolve::Tools;

/// File name of the configuration inside the painless home.
pub const CONFIG_FILE: &str = "config.toml";

/// Settings from `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Shared cache root.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Go toolchain binary.
    #[serde(default)]
    pub go: Option<String>,
    /// git client binary.
    #[serde(default)]
    pub git: Option<String>,
    /// Binary re-run for nested restores.
    #[serde(default)]
    pub self_exe: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("parsing config.toml")
    }

    /// Load `config.toml` from `home`. A missing file yields defaults.
    pub fn load(home: &Path) -> Result<Self> {
        let path = home.join(CONFIG_FILE);
        if !probe::exists(&path)? {
            return Ok(Settings::default());
        }
        let content = probe::read_to_string(&path)?;
        Self::from_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// The shared cache these settings point at.
    pub fn cache(&self, home: &Path) -> PackageCache {
        match &self.cache_dir {
            Some(dir) => PackageCache::new(dir.clone()),
            None => PackageCache::in_home(home),
        }
    }

    /// External programs, falling back to `PATH` and the running binary.
    pub fn tools(&self) -> Tools {
        let defaults = Tools::from_path();
        Tools {
            go: self.go.clone().unwrap_or(defaults.go),
            git: self.git.clone().unwrap_or(defaults.git),
            self_exe: self.self_exe.clone().unwrap_or(defaults.self_exe),
        }
    }
}

/// `$PAINLESS_HOME`, or `~/.painless` when unset.
pub fn painless_home() -> Result<PathBuf> {
    home_from(std::env::var_os("PAINLESS_HOME").map(PathBuf::from))
}

fn home_from(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(home) = explicit {
        return Ok(home);
    }
    let dirs = BaseDirs::new().context("cannot determine home directory (set PAINLESS_HOME)")?;
    Ok(dirs.home_dir().join(".painless"))
}
