use serde::{Deserialize, Serialize};

/// Aggregation function of a rollup node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorType {
    /// Any one operand good.
    #[default]
    BestOf,
    /// All operands must be good.
    WorstOf,
    /// At least `goodThreshold` operands good.
    MinGoodOf,
}

impl OperatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorType::BestOf => "BEST_OF",
            OperatorType::WorstOf => "WORST_OF",
            OperatorType::MinGoodOf => "MIN_GOOD_OF",
        }
    }
}

/// Recursive rollup operator as stored in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RollupOperatorOperands {
    pub operator_type: OperatorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_operands: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soh_monitor_type_operands: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marginal_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollup_operator_operands: Option<Vec<RollupOperatorOperands>>,
}

impl RollupOperatorOperands {
    pub fn new(operator_type: OperatorType) -> Self {
        Self {
            operator_type,
            ..Self::default()
        }
    }

    /// Child operators, empty when absent.
    pub fn children(&self) -> &[RollupOperatorOperands] {
        self.rollup_operator_operands.as_deref().unwrap_or(&[])
    }
}
