//! Resolved defaults collaborator.

use std::collections::BTreeMap;

use rollup_wire::RollupOperatorOperands;
use serde::{Deserialize, Serialize};

use crate::entry::LeafKind;
use crate::scope::Scope;

/// Supplies what is in effect for a scope before editing starts.
pub trait DefaultsSource {
    /// Default or current override for `scope`, `None` when unresolved.
    fn resolved_default(&self, scope: &Scope) -> Option<RollupOperatorOperands>;

    /// Every channel (station scopes) or monitor type (channel scopes)
    /// that "select all" and default membership are judged against.
    fn known_universe(&self, scope: &Scope) -> Vec<String>;
}

/// Everything resolved for one station, as fetched from the configuration
/// service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDefaults {
    pub station_name: String,
    pub channels: Vec<String>,
    pub monitor_types: Vec<String>,
    /// group -> channels-to-station operator
    #[serde(default)]
    pub station_capability: BTreeMap<String, RollupOperatorOperands>,
    /// group -> channel -> monitors-to-channel operator
    #[serde(default)]
    pub channel_capability: BTreeMap<String, BTreeMap<String, RollupOperatorOperands>>,
}

impl StationDefaults {
    pub fn groups(&self) -> Vec<String> {
        self.station_capability.keys().cloned().collect()
    }
}

impl DefaultsSource for StationDefaults {
    fn resolved_default(&self, scope: &Scope) -> Option<RollupOperatorOperands> {
        if scope.station_name != self.station_name {
            return None;
        }
        let group = scope.group_name.as_ref()?;
        match &scope.channel_name {
            Some(channel) => self.channel_capability.get(group)?.get(channel).cloned(),
            None => self.station_capability.get(group).cloned(),
        }
    }

    fn known_universe(&self, scope: &Scope) -> Vec<String> {
        match scope.leaf_kind() {
            LeafKind::Channel => self.channels.clone(),
            LeafKind::Monitor => self.monitor_types.clone(),
        }
    }
}
