use thiserror::Error;

/// Error raised by the backing stores (primary documents, ordered sets, task state).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("document {collection}:{id} is not a JSON object")]
    NotAnObject { collection: String, id: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Error raised by a Dao or one of its index drivers.
#[derive(Debug, Error)]
pub enum DaoError {
    /// An index driver failed after the primary write committed.
    #[error("index {index} failed: {source}")]
    Index {
        index: String,
        #[source]
        source: Box<DaoError>,
    },
    #[error("record {record} references missing {entity} {id:?}")]
    MissingDependency {
        record: String,
        entity: String,
        id: String,
    },
    #[error("index {0} reads a single key at a time")]
    UnsupportedBatchRead(String),
    #[error("no index named {0}")]
    UnknownIndex(String),
    #[error("index {0} does not produce charts")]
    NotAChart(String),
    #[error("invalid key {key:?} for index {index}")]
    InvalidKey { index: String, key: String },
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DaoError {
    /// The innermost error, looking through index wrappers.
    pub fn root(&self) -> &DaoError {
        match self {
            DaoError::Index { source, .. } => source.root(),
            other => other,
        }
    }
}
