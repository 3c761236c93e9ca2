//! Per-node error derivation and the flat error map the session keeps.

use indexmap::IndexMap;
use serde::Serialize;

use crate::entry::{LeafKind, OperatorType, RollupEntry, RollupId, RollupTree};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Leaf node with nothing selected.
    NoLeaves,
    /// Rollup of rollups without children.
    NoRollups,
    /// A `MIN_GOOD_OF` threshold above the node's operand count.
    ThresholdExceedsMax,
    /// A `MIN_GOOD_OF` marginal threshold above the good threshold.
    MarginalExceedsGood,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 4] = [
        ErrorKind::NoLeaves,
        ErrorKind::NoRollups,
        ErrorKind::ThresholdExceedsMax,
        ErrorKind::MarginalExceedsGood,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoLeaves => "NO_LEAVES",
            ErrorKind::NoRollups => "NO_ROLLUPS",
            ErrorKind::ThresholdExceedsMax => "THRESHOLD_EXCEEDS_MAX",
            ErrorKind::MarginalExceedsGood => "MARGINAL_EXCEEDS_GOOD",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub node_id: RollupId,
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorRecord {
    /// Upsert key, `"<node id> <KIND>"`.
    pub fn key(&self) -> String {
        error_key(&self.node_id, self.kind)
    }
}

fn error_key(node_id: &RollupId, kind: ErrorKind) -> String {
    format!("{} {}", node_id, kind.as_str())
}

/// Current errors of one node. An empty report clears that node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeReport {
    pub node_id: RollupId,
    pub errors: Vec<ErrorRecord>,
}

/// Names used in messages plus the tree's leaf kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationContext {
    pub kind: LeafKind,
    pub group: String,
    pub channel: Option<String>,
}

impl ValidationContext {
    pub fn station(group: impl Into<String>) -> Self {
        Self {
            kind: LeafKind::Channel,
            group: group.into(),
            channel: None,
        }
    }

    pub fn channel(group: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            kind: LeafKind::Monitor,
            group: group.into(),
            channel: Some(channel.into()),
        }
    }

    fn location(&self) -> String {
        match &self.channel {
            Some(channel) => format!("group {} channel capability {}", self.group, channel),
            None => format!("group {}", self.group),
        }
    }
}

pub fn validate_node(entry: &RollupEntry, context: &ValidationContext) -> NodeReport {
    let mut errors = Vec::new();
    let mut push = |kind, message: String| {
        errors.push(ErrorRecord {
            node_id: entry.id.clone(),
            kind,
            message,
        })
    };

    if entry.is_rollup_of_rollups() {
        if entry.rollups.is_empty() {
            push(
                ErrorKind::NoRollups,
                format!(
                    "No rollup entries for {}, must have at least one rollup entry",
                    context.location()
                ),
            );
        }
    } else if entry.members.is_empty() {
        let plural = context.kind.plural();
        push(
            ErrorKind::NoLeaves,
            format!(
                "No {plural} selected for {}, must have at least one included",
                context.location()
            ),
        );
    }

    if entry.operator_type == OperatorType::MinGoodOf {
        let threshold = entry.threshold.unwrap_or_default();
        let max = entry.operand_count();
        let operands = if entry.is_rollup_of_rollups() {
            "rollup entries"
        } else {
            context.kind.plural()
        };

        let mut exceeded = Vec::new();
        if threshold.good_threshold as usize > max {
            exceeded.push("good");
        }
        if threshold.marginal_threshold as usize > max {
            exceeded.push("marginal");
        }
        if !exceeded.is_empty() {
            push(
                ErrorKind::ThresholdExceedsMax,
                format!(
                    "Threshold input is invalid for {}: {} threshold exceeds {max} {operands}",
                    context.location(),
                    exceeded.join(" and ")
                ),
            );
        }

        if threshold.marginal_threshold > threshold.good_threshold {
            push(
                ErrorKind::MarginalExceedsGood,
                format!(
                    "Threshold input is invalid for {}: good must be greater than or equal to marginal",
                    context.location()
                ),
            );
        }
    }

    NodeReport {
        node_id: entry.id.clone(),
        errors,
    }
}

pub fn validate_tree(tree: &RollupTree, context: &ValidationContext) -> Vec<NodeReport> {
    tree.active_walk()
        .map(|entry| validate_node(entry, context))
        .collect()
}

/// Every error of `tree`, in pre-order.
pub fn validate_tree_records(tree: &RollupTree, context: &ValidationContext) -> Vec<ErrorRecord> {
    validate_tree(tree, context)
        .into_iter()
        .flat_map(|report| report.errors)
        .collect()
}

/// Flat error map keyed by `"<node id> <KIND>"`, insertion ordered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorMap {
    records: IndexMap<String, ErrorRecord>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything known about `report.node_id` with the report.
    pub fn apply(&mut self, report: NodeReport) {
        for kind in ErrorKind::ALL {
            self.records.shift_remove(&error_key(&report.node_id, kind));
        }
        for record in report.errors {
            self.records.insert(record.key(), record);
        }
    }

    pub fn apply_all(&mut self, reports: impl IntoIterator<Item = NodeReport>) {
        for report in reports {
            self.apply(report);
        }
    }

    /// Drop records of nodes that no longer exist.
    pub fn forget<'a>(&mut self, ids: impl IntoIterator<Item = &'a RollupId>) {
        for id in ids {
            for kind in ErrorKind::ALL {
                self.records.shift_remove(&error_key(id, kind));
            }
        }
    }

    pub fn get(&self, node_id: &RollupId, kind: ErrorKind) -> Option<&ErrorRecord> {
        self.records.get(&error_key(node_id, kind))
    }

    pub fn records(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
