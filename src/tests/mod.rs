//! Shared test harness: a small fixture builder plus a seeded RNG helper
//! instead of ambient global state.

mod node;
mod writer;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use crate::node::Node;
use crate::store::RTxn;
use crate::{Index, IndexOptions, NodeId, Result};

/// A scratch LMDB environment in a temp directory, torn down on drop.
pub(crate) struct Fixture {
    pub index: Index,
    _dir: TempDir,
}

impl Fixture {
    pub(crate) fn read_txn(&self) -> RTxn<'_> {
        self.index.store().begin_read().expect("begin_read")
    }

    pub(crate) fn get_node<'t>(&self, rtxn: &'t RTxn<'_>, id: NodeId) -> Result<Option<Node<'t>>> {
        self.index.store().get_node(rtxn, id)
    }
}

pub(crate) fn open(dimensions: usize, leaf_capacity: usize, n_trees: usize, metric: char, seed: u64) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = IndexOptions {
        dimensions,
        leaf_capacity,
        n_trees,
        directory: dir.path().to_path_buf(),
        metric,
        seed: Some(seed),
        ..IndexOptions::default()
    };
    let index = Index::open(options).expect("open index");
    Fixture { index, _dir: dir }
}

pub(crate) fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
