use thiserror::Error;

/// Errors surfaced by the forest store, writer, reader, and facade.
///
/// Per the propagation policy: failures never leave a transaction open, the
/// core neither retries nor tolerates partial state, and callers decide
/// whether to retry at a higher layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Any failure bubbling up from the LMDB backend: map full, corruption,
    /// a read-only violation, a missing directory. Fatal to the enclosing
    /// operation.
    #[error("store error: {0}")]
    Store(heed::Error),

    /// A node or item id that should exist could not be found. For internal
    /// tree descent this indicates a broken invariant; user-facing lookups
    /// should get `None`/empty results instead of this error for ordinary
    /// misses, so this variant is reserved for structural problems.
    #[error("no record found for id {0}")]
    NotFound(i32),

    /// The `raw` or `tree` database is missing entirely, e.g. a read-only
    /// index was opened against a directory that was never `create`d.
    #[error("the `{0}` database does not exist in this environment")]
    MissingDatabase(&'static str),

    #[error("invalid vector dimension: expected {expected}, got {received}")]
    InvalidVecDimension { expected: usize, received: usize },

    #[error("unknown metric tag {0:?}, expected 'a' (angular) or 'e' (euclidean)")]
    UnknownMetric(char),

    #[error("malformed record: {0}")]
    Serialization(String),

    /// The node id space (`i32`) has been exhausted by splits.
    #[error("node id space exhausted")]
    DatabaseFull,

    #[error("cannot write to an index opened read-only")]
    ReadOnlyIndex,
}

impl From<heed::Error> for Error {
    fn from(error: heed::Error) -> Error {
        match error {
            heed::Error::Decoding(err) => Error::Serialization(err.to_string()),
            other => Error::Store(other),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
