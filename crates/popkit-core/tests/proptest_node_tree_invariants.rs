//! Property-based invariant tests for the structural node tree.
//!
//! 1. Parent and child links stay mutually consistent under any mix of
//!    create/append/detach/remove operations.
//! 2. `contains(a, b)` agrees with walking `b`'s ancestors.
//! 3. Removed ids never answer containment queries.
//! 4. `len()` matches the number of live ids ever handed out.

use popkit_core::node::{NodeId, NodeTree};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Create,
    Append { parent: usize, child: usize },
    Detach(usize),
    Remove(usize),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        3 => Just(Op::Create),
        4 => (0usize..32, 0usize..32).prop_map(|(parent, child)| Op::Append { parent, child }),
        1 => (0usize..32).prop_map(Op::Detach),
        1 => (0usize..32).prop_map(Op::Remove),
    ];
    proptest::collection::vec(op, 1..80)
}

fn apply(ops: &[Op]) -> (NodeTree, Vec<NodeId>) {
    let mut tree = NodeTree::new();
    let mut ids = vec![tree.root()];
    for op in ops {
        match *op {
            Op::Create => ids.push(tree.create_element("div")),
            Op::Append { parent, child } => {
                let parent = ids[parent % ids.len()];
                let child = ids[child % ids.len()];
                let _ = tree.append_child(parent, child);
            }
            Op::Detach(i) => {
                let _ = tree.detach(ids[i % ids.len()]);
            }
            Op::Remove(i) => {
                let _ = tree.remove(ids[i % ids.len()]);
            }
        }
    }
    (tree, ids)
}

proptest! {
    #[test]
    fn links_stay_consistent(ops in ops()) {
        let (tree, ids) = apply(&ops);
        for &id in ids.iter().filter(|id| tree.is_live(**id)) {
            for &child in tree.children(id) {
                prop_assert!(tree.is_live(child), "dangling child {} under {}", child, id);
                prop_assert_eq!(tree.parent(child), Some(id));
            }
            if let Some(parent) = tree.parent(id) {
                prop_assert!(tree.children(parent).contains(&id));
            }
        }
    }
}

proptest! {
    #[test]
    fn contains_matches_ancestor_walk(ops in ops()) {
        let (tree, ids) = apply(&ops);
        for &a in &ids {
            for &b in &ids {
                let expected = (tree.is_live(a) && tree.is_live(b))
                    .then(|| tree.ancestors(b).any(|x| x == a));
                prop_assert_eq!(tree.contains(a, b), expected);
            }
        }
    }
}

proptest! {
    #[test]
    fn root_always_survives(ops in ops()) {
        let (tree, ids) = apply(&ops);
        prop_assert!(tree.is_attached(tree.root()));
        let live = ids.iter().filter(|id| tree.is_live(**id)).count();
        prop_assert_eq!(tree.len(), live);
    }
}
