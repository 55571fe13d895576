use heed::{BytesDecode, BytesEncode};

use crate::node::{Internal, Leaf, Node, NodeCodec, VectorCodec, VectorRecord};

#[test]
fn leaf_round_trips() {
    let leaf = Node::Leaf(Leaf { index: 3, items: vec![1, 2, 3].into() });
    let bytes = NodeCodec::bytes_encode(&leaf).unwrap();
    let decoded = NodeCodec::bytes_decode(&bytes).unwrap();
    match decoded {
        Node::Leaf(l) => {
            assert_eq!(l.index, 3);
            assert_eq!(&*l.items, &[1, 2, 3]);
        }
        Node::Internal(_) => panic!("expected leaf"),
    }
}

#[test]
fn internal_round_trips() {
    let internal = Node::Internal(Internal {
        index: 7,
        v: vec![0.5, -0.5, 1.0].into(),
        t: 0.25,
        left: 8,
        right: 9,
    });
    let bytes = NodeCodec::bytes_encode(&internal).unwrap();
    let decoded = NodeCodec::bytes_decode(&bytes).unwrap();
    match decoded {
        Node::Internal(i) => {
            assert_eq!(i.index, 7);
            assert_eq!(&*i.v, &[0.5, -0.5, 1.0]);
            assert_eq!(i.t, 0.25);
            assert_eq!(i.left, 8);
            assert_eq!(i.right, 9);
        }
        Node::Leaf(_) => panic!("expected internal"),
    }
}

#[test]
fn empty_leaf_round_trips() {
    let leaf = Node::Leaf(Leaf { index: 0, items: Vec::new().into() });
    let bytes = NodeCodec::bytes_encode(&leaf).unwrap();
    let decoded = NodeCodec::bytes_decode(&bytes).unwrap();
    assert!(decoded.into_leaf().unwrap().items.is_empty());
}

#[test]
fn truncated_record_is_rejected() {
    let internal = Node::Internal(Internal { index: 1, v: vec![1.0].into(), t: 0.0, left: 2, right: 3 });
    let bytes = NodeCodec::bytes_encode(&internal).unwrap();
    let truncated = &bytes[..bytes.len() - 6];
    assert!(NodeCodec::bytes_decode(truncated).is_err());
}

#[test]
fn vector_record_round_trips() {
    let record = VectorRecord { id: 42, data: vec![1.0, 2.0, 3.0, 4.0].into() };
    let bytes = VectorCodec::bytes_encode(&record).unwrap();
    let decoded = VectorCodec::bytes_decode(&bytes).unwrap();
    assert_eq!(decoded.id, 42);
    assert_eq!(&*decoded.data, &[1.0, 2.0, 3.0, 4.0]);
}
