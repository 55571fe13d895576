//! Incremental forest construction: `create` (reserve T empty roots) and
//! `add_item` (write the raw vector, then route it down each of the T
//! trees, splitting leaves that overflow as soon as they would exceed
//! capacity, so the store can answer queries between individual inserts).

use rand::Rng;
use tracing::{debug, trace};

use crate::distance::{Metric, Side};
use crate::node::{Internal, Leaf, Node, VectorRecord};
use crate::store::{Store, WTxn};
use crate::{Error, ItemId, NodeId, Result};

#[derive(Debug)]
pub struct Writer {
    pub(crate) dimensions: usize,
    pub(crate) leaf_capacity: usize,
    pub(crate) n_trees: usize,
}

impl Writer {
    pub fn new(dimensions: usize, leaf_capacity: usize, n_trees: usize) -> Writer {
        Writer { dimensions, leaf_capacity, n_trees }
    }

    /// Reserves node ids `0..n_trees` as empty leaf roots, the forest's
    /// initial state. Idempotent: if a root already exists (re-opening an
    /// existing environment) it is left untouched.
    pub fn create(&self, store: &Store, wtxn: &mut WTxn<'_>) -> Result<()> {
        for root in 0..self.n_trees as NodeId {
            if store.get_node(wtxn, root)?.is_none() {
                let leaf = Node::Leaf(Leaf { index: root, items: Default::default() });
                store.put_node(wtxn, root, &leaf)?;
            }
        }
        debug!(n_trees = self.n_trees, "forest roots ready");
        Ok(())
    }

    /// Writes `data` under `id` in `RAW`, then inserts it into every tree.
    /// `data` must already be validated against `self.dimensions`; the
    /// caller checks this before opening `wtxn` so invalid input never
    /// causes a transaction to be acquired.
    pub fn add_item<R: Rng>(
        &self,
        store: &Store,
        wtxn: &mut WTxn<'_>,
        metric: Metric,
        rng: &mut R,
        id: ItemId,
        data: &[f32],
    ) -> Result<()> {
        debug_assert_eq!(data.len(), self.dimensions);

        store.put_raw(wtxn, id, &VectorRecord { id, data: data.into() })?;

        for root in 0..self.n_trees as NodeId {
            trace!(item = id, tree = root, "inserting");
            self.insert(store, wtxn, metric, rng, root, id, data)?;
        }
        Ok(())
    }

    /// Routes `data_id`/`data` into the subtree rooted at `node_id`,
    /// splitting the leaf it lands in if it would overflow.
    fn insert<R: Rng>(
        &self,
        store: &Store,
        wtxn: &mut WTxn<'_>,
        metric: Metric,
        rng: &mut R,
        node_id: NodeId,
        data_id: ItemId,
        data: &[f32],
    ) -> Result<()> {
        let node = store.get_node(wtxn, node_id)?.ok_or(Error::NotFound(node_id))?;
        match node {
            Node::Leaf(leaf) if leaf.items.len() < self.leaf_capacity => {
                let mut items = leaf.items.into_owned();
                items.push(data_id);
                let leaf = Node::Leaf(Leaf { index: node_id, items: items.into() });
                store.put_node(wtxn, node_id, &leaf)?;
                Ok(())
            }
            Node::Leaf(leaf) => {
                let mut members = Vec::with_capacity(leaf.items.len());
                for &item in leaf.items.iter() {
                    let record = store.get_raw(wtxn, item)?.ok_or(Error::NotFound(item))?;
                    members.push((item, record.data.into_owned()));
                }

                let (v, t) = metric.split(&members, rng);

                // Both ids must be reserved by arithmetic before either
                // child is written: two successive calls to `last_key(TREE)
                // + 1` with no write in between would hand out the same id
                // twice.
                let base = self.fresh_node_id(store, wtxn)?;
                let left_id = base;
                let right_id = base.checked_add(1).ok_or(Error::DatabaseFull)?;

                let mut left_items = Vec::new();
                let mut right_items = Vec::new();
                for (item, vector) in &members {
                    match metric.side(&v, t, vector, rng) {
                        Side::Left => left_items.push(*item),
                        Side::Right => right_items.push(*item),
                    }
                }

                store.put_node(wtxn, left_id, &Node::Leaf(Leaf { index: left_id, items: left_items.into() }))?;
                store.put_node(wtxn, right_id, &Node::Leaf(Leaf { index: right_id, items: right_items.into() }))?;

                let internal = Node::Internal(Internal {
                    index: node_id,
                    v: v.into(),
                    t,
                    left: left_id,
                    right: right_id,
                });
                store.put_node(wtxn, node_id, &internal)?;

                debug!(node = node_id, left = left_id, right = right_id, "split leaf");

                self.insert(store, wtxn, metric, rng, node_id, data_id, data)
            }
            Node::Internal(internal) => {
                let child = match metric.side(&internal.v, internal.t, data, rng) {
                    Side::Left => internal.left,
                    Side::Right => internal.right,
                };
                self.insert(store, wtxn, metric, rng, child, data_id, data)
            }
        }
    }

    /// Allocates the base of a fresh id pair, one past the current maximum.
    /// The caller reserves `base` and `base + 1` for the two children by
    /// arithmetic and writes both before any other node mutation; a second
    /// call to this method before those writes land would see the same
    /// `last_key_tree` and collide.
    fn fresh_node_id(&self, store: &Store, wtxn: &mut WTxn<'_>) -> Result<NodeId> {
        let next = match store.last_key_tree(wtxn)? {
            Some(max) => max.checked_add(1).ok_or(Error::DatabaseFull)?,
            None => 0,
        };
        Ok(next)
    }
}
