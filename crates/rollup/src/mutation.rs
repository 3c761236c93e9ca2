//! Copy-on-write operators. Every operator leaves `self` untouched and
//! returns the edited tree.

use crate::entry::{OperatorType, RollupEntry, RollupId, RollupTree, RollupType, ThresholdField};
use crate::error::{Error, Result};
use crate::validator::{NodeReport, ValidationContext, validate_node};

impl RollupTree {
    fn edit(&self, id: &str, apply: impl FnOnce(&mut RollupEntry)) -> Result<RollupTree> {
        let location = self.locate(id)?;
        let mut next = self.clone();
        apply(next.node_at_mut(&location.path)?);
        Ok(next)
    }

    /// Include or exclude `leaf` in the membership of node `id`.
    pub fn toggle_membership(&self, id: &str, leaf: &str, included: bool) -> Result<RollupTree> {
        self.edit(id, |entry| toggle_member(&mut entry.members, leaf, included))
    }

    /// Apply one toggle to the root and every descendant so nested overrides
    /// stay consistent with a global enable/disable. Inert children are
    /// toggled too but only active nodes are reported.
    pub fn propagate_toggle(
        &self,
        leaf: &str,
        included: bool,
        context: &ValidationContext,
    ) -> (RollupTree, Vec<NodeReport>) {
        let mut next = self.clone();
        let mut reports = Vec::new();
        propagate(&mut next.root, leaf, included, true, context, &mut reports);
        (next, reports)
    }

    pub fn change_rollup_type(
        &self,
        id: &str,
        rollup_type: RollupType,
        seed: &[String],
    ) -> Result<RollupTree> {
        if !self.kind.admits(rollup_type) {
            return Err(Error::LeafKindMismatch {
                kind: self.kind,
                requested: rollup_type,
            });
        }
        let kind = self.kind;
        self.edit(id, |entry| {
            entry.rollup_type = rollup_type;
            if rollup_type == RollupType::RollupOfRollups && entry.rollups.is_empty() {
                entry.rollups.push(RollupEntry::default_child(kind, seed));
            }
        })
    }

    pub fn change_operator_type(&self, id: &str, operator_type: OperatorType) -> Result<RollupTree> {
        self.edit(id, |entry| entry.operator_type = operator_type)
    }

    /// Range checks are left to the validator.
    pub fn set_threshold(&self, id: &str, field: ThresholdField, value: u32) -> Result<RollupTree> {
        self.edit(id, |entry| {
            let threshold = entry.threshold.get_or_insert_with(Default::default);
            match field {
                ThresholdField::Good => threshold.good_threshold = value,
                ThresholdField::Marginal => threshold.marginal_threshold = value,
            }
        })
    }

    /// Prepend a default child to `parent_id` and return its id.
    pub fn add_child(&self, parent_id: &str, seed: &[String]) -> Result<(RollupTree, RollupId)> {
        let child = RollupEntry::default_child(self.kind, seed);
        let child_id = child.id.clone();
        let next = self.edit(parent_id, |parent| parent.rollups.insert(0, child))?;
        Ok((next, child_id))
    }

    /// Remove `child_id` from its parent. The root has no parent and is
    /// never removed.
    pub fn delete_child(&self, child_id: &str) -> Result<RollupTree> {
        let location = self.locate(child_id)?;
        let Some((&index, parent_path)) = location.path.split_last() else {
            return Ok(self.clone());
        };
        let mut next = self.clone();
        next.node_at_mut(parent_path)?.rollups.remove(index);
        Ok(next)
    }

    pub fn select_all(&self, id: &str, universe: &[String]) -> Result<RollupTree> {
        self.edit(id, |entry| entry.members = universe.to_vec())
    }

    pub fn deselect_all(&self, id: &str) -> Result<RollupTree> {
        self.edit(id, |entry| entry.members.clear())
    }
}

fn toggle_member(members: &mut Vec<String>, leaf: &str, included: bool) {
    if included {
        if !members.iter().any(|member| member == leaf) {
            members.insert(0, leaf.to_string());
        }
    } else {
        members.retain(|member| member != leaf);
    }
}

fn propagate(
    entry: &mut RollupEntry,
    leaf: &str,
    included: bool,
    active: bool,
    context: &ValidationContext,
    reports: &mut Vec<NodeReport>,
) {
    toggle_member(&mut entry.members, leaf, included);
    if active {
        reports.push(validate_node(entry, context));
    }
    let children_active = active && entry.is_rollup_of_rollups();
    for child in &mut entry.rollups {
        propagate(child, leaf, included, children_active, context, reports);
    }
}
