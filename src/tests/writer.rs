use crate::node::Node;
use crate::tests::open;

/// Invariant 4: once a node becomes `Internal`, its hyperplane and child
/// ids never change under further insertions, only the nodes below it do.
#[test]
fn internal_node_fields_are_fixed_after_split() {
    let fixture = open(1, 2, 1, 'e', 21);
    fixture.index.add_item(0, &[0.0]).unwrap();
    fixture.index.add_item(1, &[1.0]).unwrap();
    fixture.index.add_item(2, &[2.0]).unwrap();

    let rtxn = fixture.read_txn();
    let root = fixture.get_node(&rtxn, 0).unwrap().unwrap();
    let Node::Internal(before) = root else { panic!("root should have split") };
    let (before_v, before_t, before_left, before_right) = (before.v.into_owned(), before.t, before.left, before.right);
    drop(rtxn);

    for id in 3..20 {
        fixture.index.add_item(id, &[id as f32]).unwrap();
    }

    let rtxn = fixture.read_txn();
    let root = fixture.get_node(&rtxn, 0).unwrap().unwrap();
    let Node::Internal(after) = root else { panic!("root should still be internal") };
    assert_eq!(after.v.as_ref(), before_v.as_slice());
    assert_eq!(after.t, before_t);
    assert_eq!(after.left, before_left);
    assert_eq!(after.right, before_right);
}

/// Invariant 1: after `create`, node ids `0..T-1` exist as empty leaves and
/// nothing else does.
#[test]
fn create_reserves_empty_leaf_roots() {
    let fixture = open(2, 4, 3, 'a', 1);
    let rtxn = fixture.read_txn();
    for root in 0..3 {
        let node = fixture.get_node(&rtxn, root).unwrap().expect("root exists");
        match node {
            Node::Leaf(leaf) => {
                assert_eq!(leaf.index, root);
                assert!(leaf.items.is_empty());
            }
            Node::Internal(_) => panic!("root {root} should be a leaf"),
        }
    }
    assert!(fixture.get_node(&rtxn, 3).unwrap().is_none());
}

/// Invariant 3: a leaf never holds more than `K` items right after an
/// `add_item` completes, because the Kth insert forces a split.
#[test]
fn leaf_splits_exactly_at_capacity() {
    let fixture = open(1, 2, 1, 'e', 7);
    fixture.index.add_item(0, &[0.0]).unwrap();
    fixture.index.add_item(1, &[1.0]).unwrap();

    let rtxn = fixture.read_txn();
    let root = fixture.get_node(&rtxn, 0).unwrap().unwrap();
    assert!(root.is_leaf(), "root should still be a leaf with 2 items and capacity 2");

    fixture.index.add_item(2, &[2.0]).unwrap();
    let rtxn = fixture.read_txn();
    let root = fixture.get_node(&rtxn, 0).unwrap().unwrap();
    assert!(!root.is_leaf(), "root should have split on the third insert");
}

/// Fresh-id allocation: the two children of a split never collide with an
/// existing node id, including the forest's own reserved roots.
#[test]
fn split_children_get_fresh_ids_above_roots() {
    let fixture = open(1, 2, 2, 'e', 3);
    fixture.index.add_item(0, &[0.0]).unwrap();
    fixture.index.add_item(1, &[1.0]).unwrap();
    fixture.index.add_item(2, &[2.0]).unwrap();

    let rtxn = fixture.read_txn();
    for tree in 0..2 {
        let node = fixture.get_node(&rtxn, tree).unwrap().unwrap();
        let Node::Internal(internal) = node else { panic!("tree {tree} root should have split") };
        assert!(internal.left >= 2, "child id {} should be allocated past the reserved roots", internal.left);
        assert!(internal.right >= 2, "child id {} should be allocated past the reserved roots", internal.right);
        assert_ne!(internal.left, internal.right);
    }
}
