//! Persisted override records.

use serde::{Deserialize, Serialize};

use crate::operands::RollupOperatorOperands;

/// One override record keyed to a scope by its constraints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationOption {
    pub name: String,
    pub constraints: Vec<Constraint>,
    pub parameters: CapabilityParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

/// Parameters of a capability rollup override.
///
/// Externally tagged, so a station override serializes as
/// `{"channelsToStationRollupOperator": {...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CapabilityParameters {
    ChannelsToStationRollupOperator(RollupOperatorOperands),
    SohMonitorsToChannelRollupOperator(RollupOperatorOperands),
}

impl CapabilityParameters {
    pub fn operands(&self) -> &RollupOperatorOperands {
        match self {
            CapabilityParameters::ChannelsToStationRollupOperator(operands)
            | CapabilityParameters::SohMonitorsToChannelRollupOperator(operands) => operands,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintType {
    String,
    Default,
}

/// Selector dimension of a constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criterion {
    StationName,
    StationGroupName,
    ChannelName,
    MonitorType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetOperator {
    In,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstraintOperator {
    #[serde(rename = "type")]
    pub kind: SetOperator,
    pub negated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    pub constraint_type: ConstraintType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criterion: Option<Criterion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<ConstraintOperator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value: Vec<String>,
}

impl Constraint {
    /// `IN`-style string selector on a single value.
    pub fn is_in(criterion: Criterion, value: impl Into<String>) -> Self {
        Self {
            constraint_type: ConstraintType::String,
            criterion: Some(criterion),
            operator: Some(ConstraintOperator {
                kind: SetOperator::In,
                negated: false,
            }),
            value: vec![value.into()],
        }
    }

    /// Catch-all constraint of a default record.
    pub fn default_constraint() -> Self {
        Self {
            constraint_type: ConstraintType::Default,
            criterion: None,
            operator: None,
            value: Vec::new(),
        }
    }
}
