//! The public facade tying store, writer, reader and metric together, the
//! handle type an embedder actually constructs.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::node::Node;
use crate::NodeId;

use crate::distance::Metric;
use crate::reader::Reader;
use crate::store::Store;
use crate::writer::Writer;
use crate::{Error, ItemId, Result};

/// Construction/open parameters for an [`Index`].
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub dimensions: usize,
    pub leaf_capacity: usize,
    pub n_trees: usize,
    pub directory: PathBuf,
    pub max_readers: u32,
    pub map_size: usize,
    pub read_only: bool,
    /// `'a'` for angular, `'e'` for euclidean.
    pub metric: char,
    /// Seeds the index's internal RNG; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for IndexOptions {
    fn default() -> IndexOptions {
        IndexOptions {
            dimensions: 0,
            leaf_capacity: 32,
            n_trees: 10,
            directory: PathBuf::new(),
            max_readers: 126,
            map_size: 10 * 1024 * 1024 * 1024,
            read_only: false,
            metric: 'a',
            seed: None,
        }
    }
}

/// A single random-projection forest index over one LMDB environment.
#[derive(Debug)]
pub struct Index {
    store: Store,
    writer: Writer,
    reader: Reader,
    metric: Metric,
    rng: RefCell<StdRng>,
    read_only: bool,
    verbose: Cell<bool>,
}

impl Index {
    /// Opens (or creates, if writable and absent) an index per `options`.
    pub fn open(options: IndexOptions) -> Result<Index> {
        let metric = Metric::from_tag(options.metric)?;

        let store = if options.read_only {
            Store::open_read(&options.directory, options.max_readers)?
        } else {
            Store::open_write(&options.directory, options.max_readers, options.map_size)?
        };

        let writer = Writer::new(options.dimensions, options.leaf_capacity, options.n_trees);
        let reader = Reader::new(options.dimensions, options.n_trees);

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let index = Index {
            store,
            writer,
            reader,
            metric,
            rng: RefCell::new(rng),
            read_only: options.read_only,
            verbose: Cell::new(false),
        };

        if !index.read_only {
            let mut wtxn = index.store.begin_write()?;
            index.writer.create(&index.store, &mut wtxn)?;
            wtxn.commit()?;
        }

        Ok(index)
    }

    /// Appends `data` under `id`, routing it into every tree immediately.
    /// `id` is expected not to already exist; this is not checked here, so
    /// re-adding an existing id overwrites its raw record while still
    /// inserting a second reference into the trees.
    pub fn add_item(&self, id: ItemId, data: &[f32]) -> Result<()> {
        if self.read_only {
            return Err(Error::ReadOnlyIndex);
        }
        if data.len() != self.writer.dimensions {
            return Err(Error::InvalidVecDimension { expected: self.writer.dimensions, received: data.len() });
        }
        let mut wtxn = self.store.begin_write()?;
        {
            let mut rng = self.rng.borrow_mut();
            self.writer.add_item(&self.store, &mut wtxn, self.metric, &mut *rng, id, data)?;
        }
        wtxn.commit()?;
        if self.verbose.get() {
            info!(item = id, "added");
        }
        Ok(())
    }

    pub fn get_distance(&self, a: ItemId, b: ItemId) -> Result<f32> {
        let rtxn = self.store.begin_read()?;
        self.reader.get_distance(&self.store, &rtxn, self.metric, a, b)
    }

    pub fn get_item(&self, id: ItemId) -> Result<Option<Vec<f32>>> {
        let rtxn = self.store.begin_read()?;
        self.reader.get_item(&self.store, &rtxn, id)
    }

    pub fn get_n_items(&self) -> Result<usize> {
        let rtxn = self.store.begin_read()?;
        self.reader.get_n_items(&self.store, &rtxn)
    }

    pub fn get_nns_by_item(&self, id: ItemId, n: usize, search_k: Option<usize>) -> Result<Vec<(ItemId, f32)>> {
        let rtxn = self.store.begin_read()?;
        self.reader.query_by_item(&self.store, &rtxn, self.metric, id, n, search_k)
    }

    pub fn get_nns_by_vector(&self, query: &[f32], n: usize, search_k: Option<usize>) -> Result<Vec<(ItemId, f32)>> {
        if query.len() != self.reader.dimensions {
            return Err(Error::InvalidVecDimension { expected: self.reader.dimensions, received: query.len() });
        }
        let rtxn = self.store.begin_read()?;
        self.reader.query_by_vector(&self.store, &rtxn, self.metric, query, n, search_k)
    }

    /// No-op: there is no offline build phase here, since trees are
    /// maintained live by every `add_item` call instead.
    pub fn build(&self) -> Result<()> {
        Ok(())
    }

    /// No-op: LMDB persists every committed write already.
    pub fn save(&self) -> Result<()> {
        Ok(())
    }

    /// No-op: there is no separate on-heap structure to (re)populate.
    pub fn load(&self) -> Result<()> {
        Ok(())
    }

    /// No-op: nothing is memory-mapped beyond what LMDB itself manages.
    pub fn unload(&self) -> Result<()> {
        Ok(())
    }

    /// No-op: kept for API parity with embedders that reset state between
    /// runs; this index has no such state to reset.
    pub fn reinitialize(&self) -> Result<()> {
        Ok(())
    }

    pub fn verbose(&self, verbose: bool) {
        self.verbose.set(verbose);
    }

    pub fn dimensions(&self) -> usize {
        self.reader.dimensions()
    }

    /// Emits a node's contents as a `tracing` event. A no-op unless
    /// `verbose(true)` was called.
    pub fn display_node(&self, id: NodeId) -> Result<()> {
        if !self.verbose.get() {
            return Ok(());
        }
        let rtxn = self.store.begin_read()?;
        match self.store.get_node(&rtxn, id)? {
            Some(Node::Leaf(leaf)) => info!(node = id, items = ?leaf.items, "leaf"),
            Some(Node::Internal(internal)) => {
                info!(node = id, left = internal.left, right = internal.right, t = internal.t, "internal")
            }
            None => warn!(node = id, "no such node"),
        }
        Ok(())
    }

    /// Emits a raw vector record as a `tracing` event. A no-op unless
    /// `verbose(true)` was called.
    pub fn display_raw(&self, id: ItemId) -> Result<()> {
        if !self.verbose.get() {
            return Ok(());
        }
        let rtxn = self.store.begin_read()?;
        match self.store.get_raw(&rtxn, id)? {
            Some(record) => info!(item = id, data = ?record.data, "raw"),
            None => warn!(item = id, "no such item"),
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &Store {
        &self.store
    }
}
