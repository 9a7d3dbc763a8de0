/// Errors from catalog storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested branch, tree entry, or row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The repository is unknown to the store.
    #[error("repository not found: {0}")]
    RepositoryNotFound(String),

    /// A repository or branch with this name already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A write was attempted inside a read-only transaction.
    #[error("transaction is read-only")]
    ReadOnly,

    /// A concurrent transaction committed a conflicting write first.
    #[error("could not serialize access: {0}")]
    SerializationFailure(String),

    /// The transaction was already committed or rolled back.
    #[error("transaction already finished")]
    TransactionClosed,

    /// A path could not be stored or materialized.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Failure in the underlying storage backend.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns `true` for the expected "no such row" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
