use std::path::Path;

use heed::{Database, DatabaseFlags, Env, EnvFlags, EnvOpenOptions};

use crate::key::IdKeyCodec;
use crate::node::{Node, NodeCodec, VectorCodec, VectorRecord};
use crate::{Error, ItemId, NodeId, Result};

const RAW_DB_NAME: &str = "raw";
const TREE_DB_NAME: &str = "tree";

pub type RTxn<'e> = heed::RoTxn<'e>;
pub type WTxn<'e> = heed::RwTxn<'e>;

/// Thin facade over the LMDB backend, exposing two logical tables: `RAW`
/// (item id -> vector record) and `TREE` (node id -> node record), both
/// keyed by native-endian `i32` with LMDB's own integer-key comparator
/// (`DatabaseFlags::INTEGER_KEY`), plus transactional scopes and
/// cursor-based max-key lookup.
#[derive(Debug)]
pub struct Store {
    env: Env,
    raw: Database<IdKeyCodec, VectorCodec>,
    tree: Database<IdKeyCodec, NodeCodec>,
}

impl Store {
    /// Opens an existing environment read-only. Both tables must already
    /// exist; this is fatal otherwise since a read-only index can never
    /// call `create`.
    pub fn open_read(directory: &Path, max_readers: u32) -> Result<Store> {
        let env = unsafe {
            EnvOpenOptions::new()
                .max_readers(max_readers)
                .max_dbs(2)
                .flags(EnvFlags::READ_ONLY)
                .open(directory)
        }?;

        let rtxn = env.read_txn()?;
        let raw = env
            .database_options()
            .types::<IdKeyCodec, VectorCodec>()
            .name(RAW_DB_NAME)
            .flags(DatabaseFlags::INTEGER_KEY)
            .open(&rtxn)?
            .ok_or(Error::MissingDatabase(RAW_DB_NAME))?;
        let tree = env
            .database_options()
            .types::<IdKeyCodec, NodeCodec>()
            .name(TREE_DB_NAME)
            .flags(DatabaseFlags::INTEGER_KEY)
            .open(&rtxn)?
            .ok_or(Error::MissingDatabase(TREE_DB_NAME))?;
        rtxn.commit()?;

        Ok(Store { env, raw, tree })
    }

    /// Opens a read-write environment, creating the `RAW` and `TREE` tables
    /// on first write if either is absent.
    pub fn open_write(directory: &Path, max_readers: u32, map_size: usize) -> Result<Store> {
        let env = unsafe {
            EnvOpenOptions::new().max_readers(max_readers).max_dbs(2).map_size(map_size).open(directory)
        }?;

        let mut wtxn = env.write_txn()?;
        let raw = env
            .database_options()
            .types::<IdKeyCodec, VectorCodec>()
            .name(RAW_DB_NAME)
            .flags(DatabaseFlags::INTEGER_KEY)
            .create(&mut wtxn)?;
        let tree = env
            .database_options()
            .types::<IdKeyCodec, NodeCodec>()
            .name(TREE_DB_NAME)
            .flags(DatabaseFlags::INTEGER_KEY)
            .create(&mut wtxn)?;
        wtxn.commit()?;

        Ok(Store { env, raw, tree })
    }

    pub fn begin_read(&self) -> Result<RTxn<'_>> {
        Ok(self.env.read_txn()?)
    }

    pub fn begin_write(&self) -> Result<WTxn<'_>> {
        Ok(self.env.write_txn()?)
    }

    pub fn get_raw<'t>(&self, rtxn: &'t RTxn<'_>, id: ItemId) -> Result<Option<VectorRecord<'t>>> {
        Ok(self.raw.get(rtxn, &id)?)
    }

    pub fn put_raw(&self, wtxn: &mut WTxn<'_>, id: ItemId, record: &VectorRecord<'_>) -> Result<()> {
        self.raw.put(wtxn, &id, record)?;
        Ok(())
    }

    /// Returns `last_key(RAW)`, i.e. the greatest item id ever written.
    pub fn last_key_raw(&self, rtxn: &RTxn<'_>) -> Result<Option<ItemId>> {
        Ok(self.raw.last(rtxn)?.map(|(id, _)| id))
    }

    pub fn get_node<'t>(&self, rtxn: &'t RTxn<'_>, id: NodeId) -> Result<Option<Node<'t>>> {
        Ok(self.tree.get(rtxn, &id)?)
    }

    pub fn put_node(&self, wtxn: &mut WTxn<'_>, id: NodeId, node: &Node<'_>) -> Result<()> {
        self.tree.put(wtxn, &id, node)?;
        Ok(())
    }

    /// Returns `last_key(TREE)`, i.e. the greatest node id ever allocated.
    ///
    /// Relies on LMDB cursors seeing uncommitted puts made earlier in the
    /// same write transaction: `heed`'s cursor-backed `.last()` reads
    /// through the transaction's own write set, so a node written earlier
    /// in this very transaction is already visible here. The writer still
    /// must not call this twice to derive a pair of ids without writing in
    /// between, see `Writer::fresh_node_id`.
    pub fn last_key_tree(&self, wtxn: &WTxn<'_>) -> Result<Option<NodeId>> {
        Ok(self.tree.last(wtxn)?.map(|(id, _)| id))
    }
}
