//! Editing scenarios over a three-channel station.

use std::collections::BTreeSet;

use rollup::wire::{OperatorType, RollupOperatorOperands};
use rollup::{
    ChangeStatus, ErrorKind, LeafKind, RollupTree, RollupType, SaveDecision, Scope, Threshold,
    ThresholdField, ValidationContext, decide_save, hydrate, validate_tree_records,
};
use serde_json::json;

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn universe() -> Vec<String> {
    names(&["C1", "C2", "C3"])
}

fn station_default() -> RollupOperatorOperands {
    RollupOperatorOperands::new(OperatorType::BestOf)
}

fn kinds(tree: &RollupTree, context: &ValidationContext) -> Vec<ErrorKind> {
    validate_tree_records(tree, context)
        .into_iter()
        .map(|record| record.kind)
        .collect()
}

#[test]
fn toggle_off_persists_then_toggle_on_deletes() {
    let scope = Scope::station("STA01", "GROUPA");
    let default = station_default();
    let tree = hydrate(&default, LeafKind::Channel, &universe());
    assert_eq!(tree.root.rollup_type, RollupType::RollupOfChannels);
    assert_eq!(tree.root.members, universe());

    let root = tree.root_id().clone();
    let edited = tree.toggle_membership(root.as_str(), "C2", false).unwrap();
    assert_eq!(edited.root.members, names(&["C1", "C3"]));
    assert_eq!(
        edited.serialize(&universe()).channel_operands,
        Some(names(&["C1", "C3"]))
    );
    assert_eq!(
        edited.diff_against_default(&default, &universe()),
        ChangeStatus::Changed
    );

    let mut stored = BTreeSet::<String>::new();
    let decision = decide_save(&scope, &edited, &default, &universe(), &stored);
    let SaveDecision::Persist(option) = &decision else {
        panic!("expected persist, got {decision:?}");
    };
    let option = option.clone();
    let wire = serde_json::to_value(&option).unwrap();
    assert_eq!(wire["name"], json!("STA01_GROUPA_CAPABILITY_ROLLUP"));
    assert_eq!(
        wire["parameters"],
        json!({
            "channelsToStationRollupOperator": {
                "operatorType": "BEST_OF",
                "channelOperands": ["C1", "C3"]
            }
        })
    );
    assert_eq!(wire["priority"], json!(1));
    stored.insert(option.name.clone());

    let restored = edited.toggle_membership(root.as_str(), "C2", true).unwrap();
    assert_eq!(restored.serialize(&universe()).channel_operands, None);
    assert_eq!(
        restored.diff_against_default(&default, &universe()),
        ChangeStatus::Unchanged
    );
    assert_eq!(
        decide_save(&scope, &restored, &default, &universe(), &stored),
        SaveDecision::Delete {
            name: "STA01_GROUPA_CAPABILITY_ROLLUP".into()
        }
    );
}

#[test]
fn deleting_the_last_child_reports_no_rollups() {
    let context = ValidationContext::station("GROUPA");
    let tree = RollupTree::new(LeafKind::Channel, OperatorType::BestOf, universe());
    let root = tree.root_id().clone();
    let tree = tree
        .change_rollup_type(root.as_str(), RollupType::RollupOfRollups, &names(&["C1"]))
        .unwrap();
    let (tree, second) = tree.add_child(root.as_str(), &names(&["C2"])).unwrap();
    assert_eq!(tree.root.rollups.len(), 2);

    let tree = tree.delete_child(second.as_str()).unwrap();
    assert_eq!(tree.root.rollups.len(), 1);
    assert!(kinds(&tree, &context).is_empty());

    let last = tree.root.rollups[0].id.clone();
    let tree = tree.delete_child(last.as_str()).unwrap();
    assert!(tree.root.rollups.is_empty());
    let records = validate_tree_records(&tree, &context);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, ErrorKind::NoRollups);
    assert_eq!(records[0].node_id, root);
}

#[test]
fn good_threshold_above_channel_count() {
    let tree = RollupTree::new(LeafKind::Channel, OperatorType::MinGoodOf, universe());
    let root = tree.root_id().clone();
    let tree = tree.set_threshold(root.as_str(), ThresholdField::Good, 4).unwrap();
    assert_eq!(
        kinds(&tree, &ValidationContext::station("GROUPA")),
        vec![ErrorKind::ThresholdExceedsMax]
    );
}

#[test]
fn childless_leaf_becomes_rollup_of_rollups() {
    let tree = RollupTree::new(LeafKind::Channel, OperatorType::WorstOf, universe());
    let root = tree.root_id().clone();
    let tree = tree
        .change_rollup_type(root.as_str(), RollupType::RollupOfRollups, &names(&["C1", "C2"]))
        .unwrap();

    assert_eq!(tree.root.rollup_type, RollupType::RollupOfRollups);
    assert_eq!(tree.root.rollups.len(), 1);
    let child = &tree.root.rollups[0];
    assert_eq!(child.rollup_type, RollupType::RollupOfChannels);
    assert_eq!(child.operator_type, OperatorType::BestOf);
    assert_eq!(child.threshold, Some(Threshold::default()));
    assert_eq!(child.members, names(&["C1", "C2"]));
    assert_ne!(&child.id, tree.root_id());
}

#[test]
fn monitor_tree_refuses_channel_rollups() {
    let tree = RollupTree::new(LeafKind::Monitor, OperatorType::BestOf, names(&["LAG"]));
    let root = tree.root_id().clone();
    assert!(
        tree.change_rollup_type(root.as_str(), RollupType::RollupOfChannels, &[])
            .is_err()
    );
}

#[test]
fn channel_override_wire_shape() {
    let scope = Scope::channel("STA01", "GROUPA", "BHZ");
    let monitors = names(&["LAG", "GAP", "ENV_CLOCK_LOCKED"]);
    let default = RollupOperatorOperands::new(OperatorType::WorstOf);
    let tree = hydrate(&default, LeafKind::Monitor, &monitors);
    let root = tree.root_id().clone();
    let tree = tree
        .change_operator_type(root.as_str(), OperatorType::MinGoodOf)
        .unwrap()
        .set_threshold(root.as_str(), ThresholdField::Good, 2)
        .unwrap()
        .set_threshold(root.as_str(), ThresholdField::Marginal, 1)
        .unwrap();

    let SaveDecision::Persist(option) =
        decide_save(&scope, &tree, &default, &monitors, &BTreeSet::<String>::new())
    else {
        panic!("expected persist");
    };
    assert_eq!(
        serde_json::to_value(&option).unwrap(),
        json!({
            "name": "STA01_GROUPA_BHZ_CAPABILITY_ROLLUP",
            "constraints": [
                {"constraintType": "STRING", "criterion": "StationName",
                 "operator": {"type": "IN", "negated": false}, "value": ["STA01"]},
                {"constraintType": "STRING", "criterion": "StationGroupName",
                 "operator": {"type": "IN", "negated": false}, "value": ["GROUPA"]},
                {"constraintType": "STRING", "criterion": "ChannelName",
                 "operator": {"type": "IN", "negated": false}, "value": ["BHZ"]}
            ],
            "parameters": {
                "sohMonitorsToChannelRollupOperator": {
                    "operatorType": "MIN_GOOD_OF",
                    "goodThreshold": 2,
                    "marginalThreshold": 1
                }
            },
            "priority": 1
        })
    );
}
