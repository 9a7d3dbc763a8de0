//! Error types for the diff crate.

/// Errors that can occur during a workspace diff.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The branch being diffed does not exist.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// A tree read or workspace listing failed.
    #[error("store error: {0}")]
    Store(#[from] strata_store::StoreError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
