//! Edit scripts: TOML files of `[[edit]]` tables, one command each.
//!
//! ```toml
//! [[edit]]
//! op = "toggle_channel"
//! channel = "BHZ"
//! included = false
//!
//! [[edit]]
//! op = "set_threshold"
//! target = { group = "GROUPA" }
//! node = [0]
//! field = "good"
//! value = 2
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use rollup::Command;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditScript {
    #[serde(default)]
    pub edit: Vec<Command>,
}

impl EditScript {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse edit script")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("In {}", path.display()))
    }
}
