//! Conversion between in-memory trees and sparse wire operands, and the
//! default diff that decides whether a tree needs persisting.
//!
//! Omission on the wire means "the implied default": no membership field is
//! the full universe, no thresholds means they do not apply, no child
//! operators means the node is a leaf rollup.

use rollup_wire::RollupOperatorOperands;
use serde::{Deserialize, Serialize};

use crate::entry::{
    LeafKind, OperatorType, RollupEntry, RollupId, RollupTree, RollupType, Threshold, same_set,
};

/// Outcome of comparing a tree with its default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Unchanged,
    Changed,
}

/// Sparse wire form of `entry`. Total: whatever the user built is
/// reproduced, validity is not checked here.
pub fn serialize(entry: &RollupEntry, universe: &[String]) -> RollupOperatorOperands {
    let mut operands = RollupOperatorOperands::new(entry.operator_type);

    // Children first; a rollup without any children serializes as a leaf.
    if entry.is_rollup_of_rollups() && !entry.rollups.is_empty() {
        operands.rollup_operator_operands = Some(
            entry
                .rollups
                .iter()
                .map(|child| serialize(child, universe))
                .collect(),
        );
    }

    if let Some(kind) = entry.rollup_type.leaf_kind() {
        if !same_set(&entry.members, universe) {
            set_members(&mut operands, kind, entry.members.clone());
        }
    }

    if entry.operator_type == OperatorType::MinGoodOf {
        if let Some(threshold) = entry.threshold {
            operands.good_threshold = Some(threshold.good_threshold);
            operands.marginal_threshold = Some(threshold.marginal_threshold);
        }
    }

    operands
}

/// Build a tree for one scope from its resolved operands.
pub fn hydrate(operands: &RollupOperatorOperands, kind: LeafKind, universe: &[String]) -> RollupTree {
    let mut root = hydrate_entry(operands, kind, universe);
    root.id = RollupId::root();
    RollupTree { kind, root }
}

fn hydrate_entry(operands: &RollupOperatorOperands, kind: LeafKind, universe: &[String]) -> RollupEntry {
    let children = operands.children();
    let rollup_type = if children.is_empty() {
        kind.leaf_type()
    } else {
        RollupType::RollupOfRollups
    };

    RollupEntry {
        id: RollupId::fresh(),
        rollup_type,
        operator_type: operands.operator_type,
        threshold: Some(thresholds(operands)),
        members: members(operands, kind)
            .map(<[String]>::to_vec)
            .unwrap_or_else(|| universe.to_vec()),
        rollups: children
            .iter()
            .map(|child| hydrate_entry(child, kind, universe))
            .collect(),
    }
}

/// Compare a serialized tree with the default in effect for its scope.
///
/// The default is normalized first, so a default that spells out the full
/// universe or carries inert thresholds still compares equal to the sparse
/// form.
pub fn diff_against_default(
    serialized: &RollupOperatorOperands,
    default: &RollupOperatorOperands,
    kind: LeafKind,
    universe: &[String],
) -> ChangeStatus {
    if same_operands(serialized, default, kind, universe) {
        ChangeStatus::Unchanged
    } else {
        ChangeStatus::Changed
    }
}

fn same_operands(
    a: &RollupOperatorOperands,
    b: &RollupOperatorOperands,
    kind: LeafKind,
    universe: &[String],
) -> bool {
    if a.operator_type != b.operator_type {
        return false;
    }
    if a.operator_type == OperatorType::MinGoodOf && thresholds(a) != thresholds(b) {
        return false;
    }

    let (a_children, b_children) = (a.children(), b.children());
    if a_children.len() != b_children.len() {
        return false;
    }
    if !a_children.is_empty() {
        return a_children
            .iter()
            .zip(b_children)
            .all(|(a, b)| same_operands(a, b, kind, universe));
    }

    let a_members = members(a, kind).unwrap_or(universe);
    let b_members = members(b, kind).unwrap_or(universe);
    same_set(a_members, b_members)
}

fn thresholds(operands: &RollupOperatorOperands) -> Threshold {
    let defaults = Threshold::default();
    Threshold {
        good_threshold: operands.good_threshold.unwrap_or(defaults.good_threshold),
        marginal_threshold: operands
            .marginal_threshold
            .unwrap_or(defaults.marginal_threshold),
    }
}

fn members(operands: &RollupOperatorOperands, kind: LeafKind) -> Option<&[String]> {
    match kind {
        LeafKind::Channel => operands.channel_operands.as_deref(),
        LeafKind::Monitor => operands.soh_monitor_type_operands.as_deref(),
    }
}

fn set_members(operands: &mut RollupOperatorOperands, kind: LeafKind, members: Vec<String>) {
    match kind {
        LeafKind::Channel => operands.channel_operands = Some(members),
        LeafKind::Monitor => operands.soh_monitor_type_operands = Some(members),
    }
}

impl RollupTree {
    pub fn serialize(&self, universe: &[String]) -> RollupOperatorOperands {
        serialize(&self.root, universe)
    }

    pub fn diff_against_default(
        &self,
        default: &RollupOperatorOperands,
        universe: &[String],
    ) -> ChangeStatus {
        diff_against_default(&self.serialize(universe), default, self.kind, universe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn full_membership_is_omitted() {
        let universe = names(&["C1", "C2", "C3"]);
        let tree = RollupTree::new(LeafKind::Channel, OperatorType::BestOf, names(&["C3", "C1", "C2"]));
        assert_eq!(tree.serialize(&universe), RollupOperatorOperands::new(OperatorType::BestOf));
    }

    #[test]
    fn partial_membership_keeps_order() {
        let universe = names(&["C1", "C2", "C3"]);
        let tree = RollupTree::new(LeafKind::Monitor, OperatorType::WorstOf, names(&["C3", "C1"]));
        let operands = tree.serialize(&universe);
        assert_eq!(operands.soh_monitor_type_operands, Some(names(&["C3", "C1"])));
        assert_eq!(operands.channel_operands, None);
    }

    #[test]
    fn thresholds_only_for_min_good_of() {
        let universe = names(&["C1"]);
        let mut tree = RollupTree::new(LeafKind::Channel, OperatorType::BestOf, universe.clone());
        assert_eq!(tree.serialize(&universe).good_threshold, None);
        tree.root.operator_type = OperatorType::MinGoodOf;
        let operands = tree.serialize(&universe);
        assert_eq!(operands.good_threshold, Some(1));
        assert_eq!(operands.marginal_threshold, Some(0));
    }

    #[test]
    fn rollups_drop_membership_and_empty_children() {
        let universe = names(&["C1", "C2"]);
        let mut tree = RollupTree::new(LeafKind::Channel, OperatorType::BestOf, names(&["C1"]));
        tree.root.rollup_type = RollupType::RollupOfRollups;
        let operands = tree.serialize(&universe);
        assert_eq!(operands.rollup_operator_operands, None);
        assert_eq!(operands.channel_operands, None);

        tree.root.rollups.push(RollupEntry::default_child(LeafKind::Channel, &names(&["C2"])));
        let operands = tree.serialize(&universe);
        assert_eq!(operands.channel_operands, None);
        assert_eq!(operands.children().len(), 1);
        assert_eq!(operands.children()[0].channel_operands, Some(names(&["C2"])));
    }

    #[test]
    fn inert_children_of_a_leaf_are_not_serialized() {
        let universe = names(&["C1", "C2"]);
        let mut tree = RollupTree::new(LeafKind::Channel, OperatorType::BestOf, universe.clone());
        tree.root.rollups.push(RollupEntry::default_child(LeafKind::Channel, &names(&["C2"])));
        assert_eq!(tree.serialize(&universe).rollup_operator_operands, None);
    }

    #[test]
    fn hydrate_fills_implied_defaults() {
        let universe = names(&["C1", "C2", "C3"]);
        let operands = RollupOperatorOperands {
            operator_type: OperatorType::MinGoodOf,
            good_threshold: Some(2),
            marginal_threshold: Some(1),
            rollup_operator_operands: Some(vec![
                RollupOperatorOperands::new(OperatorType::BestOf),
                RollupOperatorOperands {
                    operator_type: OperatorType::WorstOf,
                    channel_operands: Some(names(&["C2"])),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };
        let tree = hydrate(&operands, LeafKind::Channel, &universe);
        assert!(tree.root.id.is_root());
        assert_eq!(tree.root.rollup_type, RollupType::RollupOfRollups);
        assert_eq!(tree.root.threshold, Some(Threshold { good_threshold: 2, marginal_threshold: 1 }));
        assert_eq!(tree.root.rollups[0].members, universe);
        assert_eq!(tree.root.rollups[0].rollup_type, RollupType::RollupOfChannels);
        assert_eq!(tree.root.rollups[1].members, names(&["C2"]));
        assert_ne!(tree.root.rollups[0].id, tree.root.rollups[1].id);

        assert_eq!(tree.serialize(&universe), operands);
    }

    #[test]
    fn diff_normalizes_the_default() {
        let universe = names(&["C1", "C2", "C3"]);
        let verbose_default = RollupOperatorOperands {
            operator_type: OperatorType::BestOf,
            channel_operands: Some(names(&["C2", "C3", "C1"])),
            good_threshold: Some(5),
            marginal_threshold: Some(4),
            ..Default::default()
        };
        let tree = hydrate(&verbose_default, LeafKind::Channel, &universe);
        assert_eq!(tree.diff_against_default(&verbose_default, &universe), ChangeStatus::Unchanged);

        let toggled = tree.toggle_membership(tree.root_id().as_str(), "C2", false).unwrap();
        assert_eq!(toggled.diff_against_default(&verbose_default, &universe), ChangeStatus::Changed);
    }

    #[test]
    fn diff_compares_membership_as_sets_at_depth() {
        let universe = names(&["C1", "C2", "C3"]);
        let child = |members: &[&str]| RollupOperatorOperands {
            operator_type: OperatorType::BestOf,
            channel_operands: Some(names(members)),
            ..Default::default()
        };
        let a = RollupOperatorOperands {
            operator_type: OperatorType::WorstOf,
            rollup_operator_operands: Some(vec![child(&["C1", "C2"]), child(&["C3"])]),
            ..Default::default()
        };
        let mut b = a.clone();
        b.rollup_operator_operands = Some(vec![child(&["C2", "C1"]), child(&["C3"])]);
        assert_eq!(diff_against_default(&a, &b, LeafKind::Channel, &universe), ChangeStatus::Unchanged);

        b.rollup_operator_operands = Some(vec![child(&["C3"]), child(&["C1", "C2"])]);
        assert_eq!(diff_against_default(&a, &b, LeafKind::Channel, &universe), ChangeStatus::Changed);

        let mut c = a.clone();
        c.operator_type = OperatorType::BestOf;
        assert_eq!(diff_against_default(&a, &c, LeafKind::Channel, &universe), ChangeStatus::Changed);
    }
}
