//! Edit commands: the serializable form of every operator, so edits can be
//! replayed from a script as well as issued by an editor.

use serde::{Deserialize, Serialize};

use crate::entry::{OperatorType, RollupId, RollupTree, RollupType, ThresholdField};
use crate::error::Result;
use crate::scope::Scope;

/// Which tree of the loaded station a command edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeTarget {
    pub group: String,
    /// Channel capability tree of this channel, station capability if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl TreeTarget {
    pub fn station(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            channel: None,
        }
    }

    pub fn channel(group: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            channel: Some(channel.into()),
        }
    }

    pub fn scope(&self, station: &str) -> Scope {
        match &self.channel {
            Some(channel) => Scope::channel(station, &self.group, channel),
            None => Scope::station(station, &self.group),
        }
    }
}

/// A node addressed by child-index path (`[]` is the root) or by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeRef {
    Path(Vec<usize>),
    Id(String),
}

impl Default for NodeRef {
    fn default() -> Self {
        NodeRef::Path(Vec::new())
    }
}

impl NodeRef {
    pub fn root() -> Self {
        NodeRef::default()
    }

    pub fn path(path: impl Into<Vec<usize>>) -> Self {
        NodeRef::Path(path.into())
    }

    pub fn resolve(&self, tree: &RollupTree) -> Result<RollupId> {
        match self {
            NodeRef::Path(path) => tree.id_at_path(path),
            NodeRef::Id(id) => tree.locate(id).map(|_| RollupId::from(id.as_str())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Include or exclude a channel in every station capability tree.
    ToggleChannel { channel: String, included: bool },
    /// Include or exclude a monitor type in every channel capability tree,
    /// or only in the trees of `channel` when given.
    ToggleMonitor {
        monitor: String,
        included: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel: Option<String>,
    },
    ToggleMember {
        target: TreeTarget,
        #[serde(default)]
        node: NodeRef,
        member: String,
        included: bool,
    },
    /// `seed` populates a synthesized child; the scope's universe if absent.
    ChangeRollupType {
        target: TreeTarget,
        #[serde(default)]
        node: NodeRef,
        rollup_type: RollupType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<Vec<String>>,
    },
    ChangeOperatorType {
        target: TreeTarget,
        #[serde(default)]
        node: NodeRef,
        operator_type: OperatorType,
    },
    SetThreshold {
        target: TreeTarget,
        #[serde(default)]
        node: NodeRef,
        field: ThresholdField,
        value: u32,
    },
    AddChild {
        target: TreeTarget,
        #[serde(default)]
        node: NodeRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<Vec<String>>,
    },
    DeleteChild {
        target: TreeTarget,
        node: NodeRef,
    },
    SelectAll {
        target: TreeTarget,
        #[serde(default)]
        node: NodeRef,
    },
    DeselectAll {
        target: TreeTarget,
        #[serde(default)]
        node: NodeRef,
    },
}

impl Command {
    /// The single tree this command edits, `None` for cross-tree toggles.
    pub fn target(&self) -> Option<&TreeTarget> {
        match self {
            Command::ToggleChannel { .. } | Command::ToggleMonitor { .. } => None,
            Command::ToggleMember { target, .. }
            | Command::ChangeRollupType { target, .. }
            | Command::ChangeOperatorType { target, .. }
            | Command::SetThreshold { target, .. }
            | Command::AddChild { target, .. }
            | Command::DeleteChild { target, .. }
            | Command::SelectAll { target, .. }
            | Command::DeselectAll { target, .. } => Some(target),
        }
    }
}
