use proptest::prelude::*;
use proptest::test_runner::Config;
use rdt_config_core::{ConfigNode, ConfigTree, TreeError};
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    AddSystem,
    UpdateSystem(usize),
    DeleteSystem(usize),
    AddSubsystem(usize),
    Reparent(usize, usize),
    DeleteSubsystem(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::AddSystem),
        1 => any::<usize>().prop_map(Op::UpdateSystem),
        1 => any::<usize>().prop_map(Op::DeleteSystem),
        3 => any::<usize>().prop_map(Op::AddSubsystem),
        3 => (any::<usize>(), any::<usize>()).prop_map(|(s, p)| Op::Reparent(s, p)),
        1 => any::<usize>().prop_map(Op::DeleteSubsystem),
    ]
}

/// Picks an existing id when there is one, otherwise one that never exists.
fn pick(ids: &[String], n: usize) -> String {
    if ids.is_empty() {
        "missing".to_string()
    } else {
        ids[n % ids.len()].clone()
    }
}

fn system_ids(tree: &ConfigTree) -> Vec<String> {
    tree.forest().systems().iter().map(|s| s.id.clone()).collect()
}

fn subsystem_ids(tree: &ConfigTree) -> Vec<String> {
    tree.forest().subsystems().map(|(_, s)| s.id.clone()).collect()
}

fn apply(tree: &mut ConfigTree, op: &Op, counter: &mut u64) {
    *counter += 1;
    match *op {
        Op::AddSystem => {
            let id = format!("sys-{counter}");
            tree.add_system(ConfigNode::system(id, "System")).unwrap();
        }
        Op::UpdateSystem(n) => {
            let id = pick(&system_ids(tree), n);
            let before = tree.forest().system(&id).map(|s| s.children.clone());
            let result = tree.update_system(ConfigNode::system(id.clone(), "Renamed"));
            match before {
                Some(children) => {
                    result.unwrap();
                    assert_eq!(tree.forest().system(&id).unwrap().children, children);
                }
                None => assert!(matches!(result, Err(TreeError::NotFound { .. }))),
            }
        }
        Op::DeleteSystem(n) => {
            let id = pick(&system_ids(tree), n);
            tree.delete_system(&id);
            assert!(tree
                .forest()
                .subsystems()
                .all(|(_, sub)| sub.parent_id.as_deref() != Some(id.as_str())));
        }
        Op::AddSubsystem(n) => {
            let parent = pick(&system_ids(tree), n);
            let id = format!("sub-{counter}");
            let result = tree.add_subsystem(ConfigNode::subsystem(id, parent.clone(), "Sub"), &parent);
            if tree.forest().system(&parent).is_none() {
                assert!(matches!(result, Err(TreeError::ParentNotFound { .. })));
            } else {
                result.unwrap();
            }
        }
        Op::Reparent(s, p) => {
            let sub = pick(&subsystem_ids(tree), s);
            let target = pick(&system_ids(tree), p);
            let node = ConfigNode::subsystem(sub.clone(), target.clone(), "Moved");
            let before = tree.snapshot();
            match tree.update_subsystem(node, &target) {
                Ok(_) => {
                    assert_eq!(tree.forest().locate(&sub).unwrap().id, target);
                    let holders = tree
                        .forest()
                        .systems()
                        .iter()
                        .filter(|sys| sys.children.iter().any(|c| c.id == sub))
                        .count();
                    assert_eq!(holders, 1);
                }
                Err(_) => assert_eq!(tree.forest(), before.as_ref()),
            }
        }
        Op::DeleteSubsystem(n) => {
            let id = pick(&subsystem_ids(tree), n);
            tree.delete_subsystem(&id);
            assert!(tree.forest().subsystem(&id).is_none());
            let snapshot = tree.snapshot();
            assert!(tree.delete_subsystem(&id).is_none());
            assert_eq!(tree.forest(), snapshot.as_ref());
        }
    }
}

proptest! {
    #![proptest_config(Config::with_cases(256))]
    #[test]
    fn every_subsystem_has_exactly_one_parent(ops in proptest::collection::vec(op(), 0..60)) {
        let mut tree = ConfigTree::new();
        let mut counter = 0;
        for op in &ops {
            apply(&mut tree, op, &mut counter);
            prop_assert!(tree.forest().check_invariants().is_ok());

            let mut holders: HashMap<&str, usize> = HashMap::new();
            for (_, sub) in tree.forest().subsystems() {
                *holders.entry(sub.id.as_str()).or_default() += 1;
            }
            prop_assert!(holders.values().all(|&n| n == 1));
        }
    }
}
