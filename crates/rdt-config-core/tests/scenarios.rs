use rdt_config_core::seed::demo_forest;
use rdt_config_core::{validate, ConfigNode, ConfigTree, Forest, NodeType, TreeError};
use std::collections::BTreeSet;

fn two_systems() -> ConfigTree {
    let mut tree = ConfigTree::new();
    tree.add_system(ConfigNode::system("sys-1", "Accounting System"))
        .unwrap();
    tree.add_system(ConfigNode::system("sys-2", "Global Clearing"))
        .unwrap();
    tree.add_subsystem(
        ConfigNode::subsystem("sub-1-1", "sys-1", "Accounting Frontend"),
        "sys-1",
    )
    .unwrap();
    tree
}

fn top_level(forest: &Forest) -> BTreeSet<String> {
    forest.systems().iter().map(|s| s.id.clone()).collect()
}

#[test]
fn reparent_moves_subsystem_with_updated_fields() {
    let mut tree = two_systems();
    let mut edited = ConfigNode::subsystem("sub-1-1", "sys-1", "Accounting Web");
    edited.owner_name = Some("Sarah Jenkins".into());
    edited.language = Some("React / TypeScript".into());

    tree.update_subsystem(edited.clone(), "sys-2").unwrap();

    let forest = tree.forest();
    assert!(forest.system("sys-1").unwrap().children.is_empty());
    let moved = &forest.system("sys-2").unwrap().children;
    assert_eq!(moved.len(), 1);
    assert_eq!(
        moved[0],
        ConfigNode {
            parent_id: Some("sys-2".into()),
            ..edited
        }
    );
}

#[test]
fn add_then_delete_system_restores_top_level() {
    let mut tree = ConfigTree::from_forest(demo_forest()).unwrap();
    let before = top_level(tree.forest());

    tree.add_system(ConfigNode::system("sys-3b", "Risk")).unwrap();
    assert_eq!(top_level(tree.forest()).len(), before.len() + 1);
    tree.delete_system("sys-3b").unwrap();

    assert_eq!(top_level(tree.forest()), before);
    assert_eq!(tree.forest(), &demo_forest());
}

#[test]
fn deleting_system_leaves_no_orphans() {
    let mut tree = ConfigTree::from_forest(demo_forest()).unwrap();
    tree.delete_system("sys-1").unwrap();
    let forest = tree.forest();
    assert!(forest.subsystem("sub-1-1").is_none());
    assert!(forest
        .subsystems()
        .all(|(_, sub)| sub.parent_id.as_deref() != Some("sys-1")));
    forest.check_invariants().unwrap();
}

#[test]
fn deleting_subsystem_twice_is_quiet() {
    let mut tree = two_systems();
    assert_eq!(
        tree.delete_subsystem("sub-1-1").map(|n| n.id),
        Some("sub-1-1".to_string())
    );
    let snapshot = tree.snapshot();
    assert!(tree.delete_subsystem("sub-1-1").is_none());
    assert_eq!(tree.forest(), snapshot.as_ref());
    assert_eq!(tree.forest().system("sys-1").unwrap().name, "Accounting System");
}

#[test]
fn validated_create_flow() {
    let mut tree = ConfigTree::from_forest(demo_forest()).unwrap();
    let id = rdt_config_core::next_subsystem_id(tree.forest());
    let node = validate::new_node(
        tree.forest(),
        ConfigNode::subsystem(id.clone(), "sys-3", "  Fraud Model "),
        NodeType::Subsystem,
    )
    .unwrap();
    tree.add_subsystem(node, "sys-3").unwrap();

    assert_eq!(tree.forest().subsystem(&id).unwrap().name, "Fraud Model");
    assert_eq!(tree.forest().locate(&id).unwrap().id, "sys-3");

    let blank = ConfigNode::subsystem("sub-new", "sys-3", "   ");
    assert!(matches!(
        validate::new_node(tree.forest(), blank, NodeType::Subsystem),
        Err(TreeError::ValidationFailed(_))
    ));
}

#[test]
fn old_snapshot_survives_reparent() {
    let mut tree = two_systems();
    let before = tree.snapshot();
    let sub = tree.forest().subsystem("sub-1-1").unwrap().clone();
    tree.update_subsystem(sub, "sys-2").unwrap();

    assert_eq!(before.locate("sub-1-1").unwrap().id, "sys-1");
    assert_eq!(tree.forest().locate("sub-1-1").unwrap().id, "sys-2");
}
