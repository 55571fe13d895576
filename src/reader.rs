//! Read-side forest search: priority-queue descent over all `n_trees` roots
//! followed by exact re-ranking. Uses a `BinaryHeap` ordered by
//! `OrderedFloat<f32>` and a plain `HashSet` seen-set, then a final
//! exact-distance sort-and-truncate pass.

use std::collections::{BinaryHeap, HashSet};

use ordered_float::OrderedFloat;

use crate::distance::Metric;
use crate::node::Node;
use crate::store::{RTxn, Store};
use crate::{Error, ItemId, NodeId, Result};

#[derive(Debug)]
pub struct Reader {
    pub(crate) dimensions: usize,
    pub(crate) n_trees: usize,
}

impl Reader {
    pub fn new(dimensions: usize, n_trees: usize) -> Reader {
        Reader { dimensions, n_trees }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Exact distance between two stored items.
    pub fn get_distance(&self, store: &Store, rtxn: &RTxn<'_>, metric: Metric, a: ItemId, b: ItemId) -> Result<f32> {
        let a = store.get_raw(rtxn, a)?.ok_or(Error::NotFound(a))?;
        let b = store.get_raw(rtxn, b)?.ok_or(Error::NotFound(b))?;
        Ok(metric.distance(&a.data, &b.data))
    }

    /// The raw vector stored under `id`, or `None` if it was never added.
    pub fn get_item(&self, store: &Store, rtxn: &RTxn<'_>, id: ItemId) -> Result<Option<Vec<f32>>> {
        Ok(store.get_raw(rtxn, id)?.map(|record| record.data.into_owned()))
    }

    /// One past the greatest item id ever written. This is a dense-prefix
    /// count: it overstates the true cardinality if items were never added
    /// contiguously from 0 (this index never deletes, so in practice it
    /// always equals the true count).
    pub fn get_n_items(&self, store: &Store, rtxn: &RTxn<'_>) -> Result<usize> {
        match store.last_key_raw(rtxn)? {
            Some(max) => Ok(max as usize + 1),
            None => Ok(0),
        }
    }

    pub fn query_by_item(
        &self,
        store: &Store,
        rtxn: &RTxn<'_>,
        metric: Metric,
        id: ItemId,
        n: usize,
        search_k: Option<usize>,
    ) -> Result<Vec<(ItemId, f32)>> {
        let Some(record) = store.get_raw(rtxn, id)? else {
            return Ok(vec![]);
        };
        let query = record.data.into_owned();
        self.query_by_vector(store, rtxn, metric, &query, n, search_k)
    }

    /// `query` must already be validated against `self.dimensions`; the
    /// caller checks this before opening `rtxn` so invalid input never
    /// causes a transaction to be acquired.
    pub fn query_by_vector(
        &self,
        store: &Store,
        rtxn: &RTxn<'_>,
        metric: Metric,
        query: &[f32],
        n: usize,
        search_k: Option<usize>,
    ) -> Result<Vec<(ItemId, f32)>> {
        debug_assert_eq!(query.len(), self.dimensions);

        let search_k = search_k.unwrap_or_else(|| n * self.n_trees);

        let mut queue: BinaryHeap<(OrderedFloat<f32>, NodeId)> = BinaryHeap::new();
        for root in 0..self.n_trees as NodeId {
            queue.push((OrderedFloat(f32::INFINITY), root));
        }

        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut candidates: Vec<ItemId> = Vec::new();

        while candidates.len() < search_k {
            let Some((priority, node_id)) = queue.pop() else { break };
            if priority.0.is_nan() {
                continue;
            }
            let node = store.get_node(rtxn, node_id)?.ok_or(Error::NotFound(node_id))?;
            match node {
                Node::Leaf(leaf) => {
                    for &item in leaf.items.iter() {
                        if seen.insert(item) {
                            candidates.push(item);
                        }
                    }
                }
                Node::Internal(internal) => {
                    // margin > 0 means a point would route to `left` at
                    // insertion time (see Metric::side), so the branch a
                    // query is likely to belong to gets the less-penalized
                    // priority: left keeps +margin, right gets -margin.
                    let margin = metric.margin(&internal.v, internal.t, query);
                    queue.push((OrderedFloat(priority.0.min(margin)), internal.left));
                    queue.push((OrderedFloat(priority.0.min(-margin)), internal.right));
                }
            }
        }

        let mut ranked = Vec::with_capacity(candidates.len());
        for item in candidates {
            let record = store.get_raw(rtxn, item)?.ok_or(Error::NotFound(item))?;
            let d = metric.distance(query, &record.data);
            ranked.push((item, d));
        }
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(n);
        for (_, d) in ranked.iter_mut() {
            *d = metric.normalized_distance(*d);
        }
        Ok(ranked)
    }
}
