//! In-memory rollup tree.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

pub use rollup_wire::OperatorType;

/// Node id, unique within one tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RollupId(String);

impl RollupId {
    /// Prefix marking the root of a scope.
    pub const ROOT_MARKER: &'static str = "default ";

    /// Fresh opaque id for a non-root node.
    pub fn fresh() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Fresh root id (`"default <ulid>"`).
    pub fn root() -> Self {
        Self(format!("{}{}", Self::ROOT_MARKER, Ulid::new()))
    }

    pub fn is_root(&self) -> bool {
        Self::is_root_str(&self.0)
    }

    /// Only the leading marker counts, so a fresh ULID can never be taken
    /// for a root.
    pub fn is_root_str(id: &str) -> bool {
        id.starts_with(Self::ROOT_MARKER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RollupId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RollupId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RollupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RollupType {
    RollupOfChannels,
    RollupOfMonitors,
    RollupOfRollups,
}

impl RollupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RollupType::RollupOfChannels => "ROLLUP_OF_CHANNELS",
            RollupType::RollupOfMonitors => "ROLLUP_OF_MONITORS",
            RollupType::RollupOfRollups => "ROLLUP_OF_ROLLUPS",
        }
    }

    /// Leaf kind aggregated by this type, `None` for rollups of rollups.
    pub fn leaf_kind(&self) -> Option<LeafKind> {
        match self {
            RollupType::RollupOfChannels => Some(LeafKind::Channel),
            RollupType::RollupOfMonitors => Some(LeafKind::Monitor),
            RollupType::RollupOfRollups => None,
        }
    }
}

/// What the leaves of a tree are. Fixed for a whole tree: station
/// capability trees roll up channels, channel capability trees roll up
/// monitor types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Channel,
    Monitor,
}

impl LeafKind {
    pub fn leaf_type(&self) -> RollupType {
        match self {
            LeafKind::Channel => RollupType::RollupOfChannels,
            LeafKind::Monitor => RollupType::RollupOfMonitors,
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            LeafKind::Channel => "channels",
            LeafKind::Monitor => "monitors",
        }
    }

    /// Whether `rollup_type` may appear in a tree of this kind.
    pub fn admits(&self, rollup_type: RollupType) -> bool {
        rollup_type == RollupType::RollupOfRollups || rollup_type == self.leaf_type()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threshold {
    pub good_threshold: u32,
    pub marginal_threshold: u32,
}

impl Default for Threshold {
    fn default() -> Self {
        Self {
            good_threshold: 1,
            marginal_threshold: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdField {
    Good,
    Marginal,
}

/// One aggregation rule node.
///
/// `members` is active only for leaf rollup types and `rollups` only for
/// [`RollupType::RollupOfRollups`]; the inactive one is kept untouched so a
/// round trip through another rollup type restores it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupEntry {
    pub id: RollupId,
    pub rollup_type: RollupType,
    pub operator_type: OperatorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub rollups: Vec<RollupEntry>,
}

impl RollupEntry {
    /// The child synthesized by "add rollup" and by switching a childless
    /// node to a rollup of rollups.
    pub fn default_child(kind: LeafKind, seed: &[String]) -> Self {
        Self {
            id: RollupId::fresh(),
            rollup_type: kind.leaf_type(),
            operator_type: OperatorType::BestOf,
            threshold: Some(Threshold::default()),
            members: seed.to_vec(),
            rollups: Vec::new(),
        }
    }

    pub fn is_rollup_of_rollups(&self) -> bool {
        self.rollup_type == RollupType::RollupOfRollups
    }

    /// Number of operands the thresholds of this node are measured against.
    pub fn operand_count(&self) -> usize {
        if self.is_rollup_of_rollups() {
            self.rollups.len()
        } else {
            self.members.len()
        }
    }

    /// Pre-order walk over this node and all descendants.
    pub fn walk(&self) -> impl Iterator<Item = &RollupEntry> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let entry = stack.pop()?;
            stack.extend(entry.rollups.iter().rev());
            Some(entry)
        })
    }

    /// Pre-order walk that skips children of leaf rollup types. Those are
    /// inert: never serialized, validated or checked for conflicts.
    pub fn active_walk(&self) -> impl Iterator<Item = &RollupEntry> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let entry = stack.pop()?;
            if entry.is_rollup_of_rollups() {
                stack.extend(entry.rollups.iter().rev());
            }
            Some(entry)
        })
    }

    /// Structural equality ignoring ids and inert fields.
    pub fn same_shape(&self, other: &RollupEntry) -> bool {
        if self.rollup_type != other.rollup_type || self.operator_type != other.operator_type {
            return false;
        }
        if self.operator_type == OperatorType::MinGoodOf
            && self.threshold.unwrap_or_default() != other.threshold.unwrap_or_default()
        {
            return false;
        }
        if self.is_rollup_of_rollups() {
            self.rollups.len() == other.rollups.len()
                && self
                    .rollups
                    .iter()
                    .zip(&other.rollups)
                    .all(|(a, b)| a.same_shape(b))
        } else {
            same_set(&self.members, &other.members)
        }
    }
}

/// Order-insensitive comparison of two membership lists.
pub fn same_set(a: &[String], b: &[String]) -> bool {
    let mut a: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = b.iter().map(String::as_str).collect();
    a.sort_unstable();
    a.dedup();
    b.sort_unstable();
    b.dedup();
    a == b
}

/// One independent capability tree together with its leaf kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupTree {
    pub kind: LeafKind,
    pub root: RollupEntry,
}

impl RollupTree {
    /// Fresh single-node tree over `members`.
    pub fn new(kind: LeafKind, operator_type: OperatorType, members: Vec<String>) -> Self {
        Self {
            kind,
            root: RollupEntry {
                id: RollupId::root(),
                rollup_type: kind.leaf_type(),
                operator_type,
                threshold: Some(Threshold::default()),
                members,
                rollups: Vec::new(),
            },
        }
    }

    pub fn root_id(&self) -> &RollupId {
        &self.root.id
    }

    pub fn walk(&self) -> impl Iterator<Item = &RollupEntry> {
        self.root.walk()
    }

    pub fn active_walk(&self) -> impl Iterator<Item = &RollupEntry> {
        self.root.active_walk()
    }

    pub fn same_shape(&self, other: &RollupTree) -> bool {
        self.kind == other.kind && self.root.same_shape(&other.root)
    }
}
