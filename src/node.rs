use std::borrow::Cow;
use std::mem::size_of;

use bytemuck::{bytes_of, cast_slice, pod_collect_to_vec, pod_read_unaligned, try_cast_slice, Pod, Zeroable};
use heed::BoxedError;

use crate::{ItemId, NodeId};

const LEAF_TAG: u8 = 0;
const INTERNAL_TAG: u8 = 1;

/// A tree node: either a leaf holding up to `K` item ids, or an internal
/// node holding a split hyperplane and two children.
///
/// A node is never both at once: leaves carry `items` and no
/// hyperplane/children, internal nodes carry the hyperplane/children and no
/// items.
#[derive(Debug, Clone)]
pub enum Node<'a> {
    Leaf(Leaf<'a>),
    Internal(Internal<'a>),
}

#[derive(Debug, Clone)]
pub struct Leaf<'a> {
    /// Redundant copy of the node's own key, for self-checks.
    pub index: NodeId,
    pub items: Cow<'a, [ItemId]>,
}

#[derive(Debug, Clone)]
pub struct Internal<'a> {
    pub index: NodeId,
    /// Hyperplane normal.
    pub v: Cow<'a, [f32]>,
    /// Hyperplane offset; always `0.0` for angular.
    pub t: f32,
    pub left: NodeId,
    pub right: NodeId,
}

impl<'a> Node<'a> {
    pub fn into_leaf(self) -> Option<Leaf<'a>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Internal(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct LeafHeader {
    index: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct InternalHeader {
    index: i32,
    left: i32,
    right: i32,
    t: f32,
}

/// Codec for `TREE` entries.
pub enum NodeCodec {}

impl<'a> heed::BytesEncode<'a> for NodeCodec {
    type EItem = Node<'a>;

    fn bytes_encode(node: &'a Node<'a>) -> Result<Cow<'a, [u8]>, BoxedError> {
        let mut bytes = Vec::new();
        match node {
            Node::Leaf(Leaf { index, items }) => {
                bytes.push(LEAF_TAG);
                bytes.extend_from_slice(bytes_of(&LeafHeader { index: *index }));
                bytes.extend_from_slice(cast_slice(items));
            }
            Node::Internal(Internal { index, v, t, left, right }) => {
                bytes.push(INTERNAL_TAG);
                bytes.extend_from_slice(bytes_of(&InternalHeader {
                    index: *index,
                    left: *left,
                    right: *right,
                    t: *t,
                }));
                bytes.extend_from_slice(cast_slice(v));
            }
        }
        Ok(Cow::Owned(bytes))
    }
}

impl<'a> heed::BytesDecode<'a> for NodeCodec {
    type DItem = Node<'a>;

    fn bytes_decode(bytes: &'a [u8]) -> Result<Node<'a>, BoxedError> {
        match bytes.split_first() {
            Some((&LEAF_TAG, rest)) => {
                let (header_bytes, payload) = split_at(rest, size_of::<LeafHeader>())?;
                let header: LeafHeader = pod_read_unaligned(header_bytes);
                Ok(Node::Leaf(Leaf { index: header.index, items: aligned_or_collect_vec(payload)? }))
            }
            Some((&INTERNAL_TAG, rest)) => {
                let (header_bytes, payload) = split_at(rest, size_of::<InternalHeader>())?;
                let header: InternalHeader = pod_read_unaligned(header_bytes);
                Ok(Node::Internal(Internal {
                    index: header.index,
                    v: aligned_or_collect_vec(payload)?,
                    t: header.t,
                    left: header.left,
                    right: header.right,
                }))
            }
            Some((tag, _)) => Err(format!("unknown node tag {tag}").into()),
            None => Err("empty node record".into()),
        }
    }
}

/// A raw vector record, keyed by item id in the `RAW` table.
#[derive(Debug, Clone)]
pub struct VectorRecord<'a> {
    /// Redundant copy of the item's own key, for self-checks.
    pub id: ItemId,
    pub data: Cow<'a, [f32]>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct VectorHeader {
    id: i32,
}

pub enum VectorCodec {}

impl<'a> heed::BytesEncode<'a> for VectorCodec {
    type EItem = VectorRecord<'a>;

    fn bytes_encode(record: &'a VectorRecord<'a>) -> Result<Cow<'a, [u8]>, BoxedError> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(bytes_of(&VectorHeader { id: record.id }));
        bytes.extend_from_slice(cast_slice(&record.data));
        Ok(Cow::Owned(bytes))
    }
}

impl<'a> heed::BytesDecode<'a> for VectorCodec {
    type DItem = VectorRecord<'a>;

    fn bytes_decode(bytes: &'a [u8]) -> Result<VectorRecord<'a>, BoxedError> {
        let (header_bytes, payload) = split_at(bytes, size_of::<VectorHeader>())?;
        let header: VectorHeader = pod_read_unaligned(header_bytes);
        Ok(VectorRecord { id: header.id, data: aligned_or_collect_vec(payload)? })
    }
}

fn split_at(bytes: &[u8], mid: usize) -> Result<(&[u8], &[u8]), BoxedError> {
    if bytes.len() < mid {
        return Err("record shorter than its fixed header".into());
    }
    Ok(bytes.split_at(mid))
}

/// Casts a byte slice into `[T]` without copying when it is already
/// aligned, falling back to an owned copy when it merely needs realigning.
fn aligned_or_collect_vec<T: Pod + Zeroable>(bytes: &[u8]) -> Result<Cow<'_, [T]>, BoxedError> {
    use bytemuck::PodCastError::TargetAlignmentGreaterAndInputNotAligned;
    match try_cast_slice(bytes) {
        Ok(casted) => Ok(Cow::Borrowed(casted)),
        Err(TargetAlignmentGreaterAndInputNotAligned) => Ok(Cow::Owned(pod_collect_to_vec(bytes))),
        Err(e) => Err(format!("could not cast node payload: {e}").into()),
    }
}
