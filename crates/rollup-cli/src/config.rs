//! Discovery of `rollup.toml`.
//!
//! Search order: an explicit `--config` path, then the current directory
//! upward, then built-in defaults. Relative paths in the file are resolved
//! against the directory holding it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "rollup.toml";
pub const DEFAULT_DEFAULTS: &str = "defaults.json";
pub const DEFAULT_OVERRIDES: &str = "overrides";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Resolved station defaults bundle (JSON).
    pub defaults: PathBuf,
    /// Directory of persisted override records.
    pub overrides: PathBuf,
    pub source: ConfigSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Default,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    defaults: Option<PathBuf>,
    overrides: Option<PathBuf>,
}

fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    let base = path.parent().unwrap_or(Path::new("."));
    Ok(Config {
        defaults: base.join(file.defaults.unwrap_or_else(|| DEFAULT_DEFAULTS.into())),
        overrides: base.join(file.overrides.unwrap_or_else(|| DEFAULT_OVERRIDES.into())),
        source: ConfigSource::File(path.to_path_buf()),
    })
}

pub fn load(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    match find_config(&cwd) {
        Some(path) => read_config(&path),
        None => Ok(Config {
            defaults: DEFAULT_DEFAULTS.into(),
            overrides: DEFAULT_OVERRIDES.into(),
            source: ConfigSource::Default,
        }),
    }
}

impl Config {
    /// Command line flags win over the file.
    pub fn with_flags(mut self, defaults: Option<PathBuf>, overrides: Option<PathBuf>) -> Self {
        if let Some(defaults) = defaults {
            self.defaults = defaults;
        }
        if let Some(overrides) = overrides {
            self.overrides = overrides;
        }
        self
    }
}
