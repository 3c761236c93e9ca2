//! Read-only queries used by threshold inputs and conflict warnings.

use crate::entry::RollupTree;
use crate::error::Result;

impl RollupTree {
    /// Largest threshold node `id` accepts: its operand count.
    pub fn max_threshold(&self, id: &str) -> Result<usize> {
        Ok(self.get(id)?.operand_count())
    }

    /// Members of active leaf nodes that are not in `selected`, first seen
    /// first, without duplicates.
    pub fn conflicted_members(&self, selected: &[String]) -> Vec<String> {
        let mut conflicted: Vec<String> = Vec::new();
        for entry in self.active_walk().filter(|entry| !entry.is_rollup_of_rollups()) {
            for member in &entry.members {
                if !selected.contains(member) && !conflicted.contains(member) {
                    conflicted.push(member.clone());
                }
            }
        }
        conflicted
    }
}

#[cfg(test)]
mod tests {
    use crate::entry::{LeafKind, OperatorType, RollupTree, RollupType};

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn conflicts_come_from_active_leaves_only() {
        let tree = RollupTree::new(LeafKind::Monitor, OperatorType::BestOf, names(&["LAG", "GAP"]));
        let root = tree.root_id().clone();
        let tree = tree
            .change_rollup_type(root.as_str(), RollupType::RollupOfRollups, &names(&["LAG", "ENV"]))
            .unwrap();
        let (tree, _) = tree.add_child(root.as_str(), &names(&["ENV", "TIMELINESS"])).unwrap();

        // "GAP" only lives in the inert root list
        assert_eq!(tree.conflicted_members(&names(&["LAG"])), names(&["ENV", "TIMELINESS"]));
        assert!(tree.conflicted_members(&names(&["LAG", "ENV", "TIMELINESS"])).is_empty());
    }

    #[test]
    fn inert_children_never_conflict() {
        let tree = RollupTree::new(LeafKind::Channel, OperatorType::BestOf, names(&["C1"]));
        let root = tree.root_id().clone();
        let tree = tree
            .change_rollup_type(root.as_str(), RollupType::RollupOfRollups, &names(&["C9"]))
            .unwrap()
            .change_rollup_type(root.as_str(), RollupType::RollupOfChannels, &[])
            .unwrap();
        assert_eq!(tree.root.rollups[0].members, names(&["C9"]));
        assert!(tree.conflicted_members(&names(&["C1"])).is_empty());
    }

    #[test]
    fn max_threshold_tracks_rollup_type() {
        let tree = RollupTree::new(LeafKind::Channel, OperatorType::MinGoodOf, names(&["C1", "C2", "C3"]));
        let root = tree.root_id().clone();
        assert_eq!(tree.max_threshold(root.as_str()).unwrap(), 3);
        let tree = tree
            .change_rollup_type(root.as_str(), RollupType::RollupOfRollups, &[])
            .unwrap();
        assert_eq!(tree.max_threshold(root.as_str()).unwrap(), 1);
    }
}
