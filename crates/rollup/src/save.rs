//! What to do with one scope's override record at save time.

use rollup_wire::{CapabilityParameters, ConfigurationOption, RollupOperatorOperands};

use crate::entry::{LeafKind, RollupTree};
use crate::scope::Scope;
use crate::serializer::ChangeStatus;

/// Priority carried by capability overrides.
pub const OVERRIDE_PRIORITY: u32 = 1;

/// Read side of the persisted override records.
pub trait OverrideStore {
    /// Whether an override with this name exists.
    fn contains(&self, name: &str) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveDecision {
    /// Matches the default and nothing is stored.
    None,
    /// Reverted to the default; the stored override must go.
    Delete { name: String },
    /// Differs from the default.
    Persist(ConfigurationOption),
}

impl SaveDecision {
    pub fn action(&self) -> &'static str {
        match self {
            SaveDecision::None => "none",
            SaveDecision::Delete { .. } => "delete",
            SaveDecision::Persist(_) => "persist",
        }
    }
}

/// Serialize `tree`, diff it against `default` and decide. Pure and
/// idempotent, so it can be rerun after a failed persist.
pub fn decide_save(
    scope: &Scope,
    tree: &RollupTree,
    default: &RollupOperatorOperands,
    universe: &[String],
    store: &dyn OverrideStore,
) -> SaveDecision {
    let serialized = tree.serialize(universe);
    let status = crate::serializer::diff_against_default(&serialized, default, tree.kind, universe);
    let name = scope.override_name();

    let decision = match status {
        ChangeStatus::Unchanged if store.contains(&name) => SaveDecision::Delete { name },
        ChangeStatus::Unchanged => SaveDecision::None,
        ChangeStatus::Changed => SaveDecision::Persist(override_option(scope, tree.kind, serialized)),
    };
    log::debug!("{scope}: {}", decision.action());
    decision
}

pub fn override_option(
    scope: &Scope,
    kind: LeafKind,
    operands: RollupOperatorOperands,
) -> ConfigurationOption {
    let parameters = match kind {
        LeafKind::Channel => CapabilityParameters::ChannelsToStationRollupOperator(operands),
        LeafKind::Monitor => CapabilityParameters::SohMonitorsToChannelRollupOperator(operands),
    };
    ConfigurationOption {
        name: scope.override_name(),
        constraints: scope.constraints(),
        parameters,
        priority: Some(OVERRIDE_PRIORITY),
    }
}

impl OverrideStore for std::collections::BTreeSet<String> {
    fn contains(&self, name: &str) -> bool {
        std::collections::BTreeSet::contains(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::OperatorType;
    use std::collections::BTreeSet;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn monitor_scope_uses_channel_parameters() {
        let scope = Scope::channel("STA01", "GROUPA", "BHZ");
        let universe = names(&["LAG", "MISSING"]);
        let tree = RollupTree::new(LeafKind::Monitor, OperatorType::BestOf, names(&["LAG"]));
        let default = RollupOperatorOperands::new(OperatorType::BestOf);

        let stored = BTreeSet::<String>::new();
        let decision = decide_save(&scope, &tree, &default, &universe, &stored);
        let SaveDecision::Persist(option) = decision else {
            panic!("expected persist");
        };
        assert_eq!(option.name, "STA01_GROUPA_BHZ_CAPABILITY_ROLLUP");
        assert_eq!(option.priority, Some(1));
        assert!(matches!(
            option.parameters,
            CapabilityParameters::SohMonitorsToChannelRollupOperator(_)
        ));
        assert_eq!(option.parameters.operands().soh_monitor_type_operands, Some(names(&["LAG"])));
    }

    #[test]
    fn unchanged_deletes_only_when_stored() {
        let scope = Scope::station("STA01", "GROUPA");
        let universe = names(&["C1", "C2"]);
        let tree = RollupTree::new(LeafKind::Channel, OperatorType::BestOf, universe.clone());
        let default = RollupOperatorOperands::new(OperatorType::BestOf);

        let empty = BTreeSet::<String>::new();
        assert_eq!(decide_save(&scope, &tree, &default, &universe, &empty), SaveDecision::None);

        let stored: BTreeSet<String> = [scope.override_name()].into();
        assert_eq!(
            decide_save(&scope, &tree, &default, &universe, &stored),
            SaveDecision::Delete {
                name: scope.override_name()
            }
        );
    }
}
