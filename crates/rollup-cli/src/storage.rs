//! File-based override records: one `<name>.json` per override.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rollup_wire::ConfigurationOption;
use rollup::{OverrideStore, SaveDecision, Scope};

pub struct FileStorage {
    base_path: PathBuf,
}

/// What a save wrote to disk.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub persisted: Vec<String>,
    pub deleted: Vec<String>,
}

impl FileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", name))
    }

    pub fn load(&self, name: &str) -> Result<Option<ConfigurationOption>> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read override: {}", path.display()))?;
        let option = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse override: {}", path.display()))?;
        Ok(Some(option))
    }

    pub fn persist(&self, option: &ConfigurationOption) -> Result<()> {
        fs::create_dir_all(&self.base_path)
            .with_context(|| format!("Failed to create {}", self.base_path.display()))?;
        let path = self.path(&option.name);
        let json = serde_json::to_string_pretty(option)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.path(name);
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))
    }

    /// Carry out save decisions. Stops at the first failed write; the
    /// decisions can simply be recomputed and rerun.
    pub fn save(&self, decisions: &[(Scope, SaveDecision)]) -> Result<SaveSummary> {
        let mut summary = SaveSummary::default();
        for (scope, decision) in decisions {
            match decision {
                SaveDecision::None => {}
                SaveDecision::Delete { name } => {
                    self.remove(name)?;
                    summary.deleted.push(name.clone());
                }
                SaveDecision::Persist(option) => {
                    self.persist(option)?;
                    summary.persisted.push(option.name.clone());
                }
            }
            log::debug!("{scope}: {}", decision.action());
        }
        Ok(summary)
    }
}

impl OverrideStore for FileStorage {
    fn contains(&self, name: &str) -> bool {
        self.path(name).exists()
    }
}

#[cfg(test)]
mod tests {
    use rollup_wire::{CapabilityParameters, OperatorType, RollupOperatorOperands};

    use super::*;

    fn temp_storage() -> (PathBuf, FileStorage) {
        let dir = std::env::temp_dir().join(format!("rollup-storage-{}", ulid::Ulid::new()));
        (dir.clone(), FileStorage::new(dir))
    }

    fn option(scope: &Scope) -> ConfigurationOption {
        ConfigurationOption {
            name: scope.override_name(),
            constraints: scope.constraints(),
            parameters: CapabilityParameters::ChannelsToStationRollupOperator(
                RollupOperatorOperands::new(OperatorType::WorstOf),
            ),
            priority: Some(1),
        }
    }

    #[test]
    fn persist_then_delete() {
        let (dir, storage) = temp_storage();
        let scope = Scope::station("STA01", "GROUPA");
        let option = option(&scope);

        let summary = storage
            .save(&[(scope.clone(), SaveDecision::Persist(option.clone()))])
            .unwrap();
        assert_eq!(summary.persisted, vec![option.name.clone()]);
        assert!(storage.contains(&option.name));
        assert_eq!(storage.load(&option.name).unwrap(), Some(option.clone()));

        let summary = storage
            .save(&[(
                scope,
                SaveDecision::Delete {
                    name: option.name.clone(),
                },
            )])
            .unwrap();
        assert_eq!(summary.deleted, vec![option.name.clone()]);
        assert!(!storage.contains(&option.name));
        assert_eq!(storage.load(&option.name).unwrap(), None);
        fs::remove_dir_all(dir).unwrap();
    }
}
