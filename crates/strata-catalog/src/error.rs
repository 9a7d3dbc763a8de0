//! Error types for catalog operations.

use std::time::Duration;

use strata_diff::DiffError;
use strata_store::StoreError;
use thiserror::Error;

/// An inbound identifier failed validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid {field} {value:?}: {reason}")]
pub struct ValidationError {
    /// Which argument was rejected (`"repository"`, `"branch"`, `"path"`).
    pub field: &'static str,
    /// The rejected value.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An argument was malformed. Raised before any storage access.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The branch does not exist in the repository.
    #[error("branch not found: {repository}/{branch}")]
    BranchNotFound { repository: String, branch: String },

    /// No staged entry exists at the path.
    #[error("entry not found: {path} on {repository}/{branch}")]
    EntryNotFound {
        repository: String,
        branch: String,
        path: String,
    },

    /// The store violated an invariant the catalog relies on.
    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),

    /// The unit of work did not finish within the configured timeout.
    #[error("transaction on {repository} timed out after {timeout:?}")]
    Timeout { repository: String, timeout: Duration },

    /// A read or write failed inside the transaction.
    #[error("storage error on {repository}/{branch}: {source}")]
    Storage {
        repository: String,
        branch: String,
        #[source]
        source: StoreError,
    },

    /// Opening, committing, or rolling back the transaction failed.
    #[error("transaction error on {repository}: {source}")]
    Transaction {
        repository: String,
        #[source]
        source: StoreError,
    },

    /// The catalog configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CatalogError {
    /// Attach repository and branch context to a store error.
    ///
    /// A missing branch surfaces as [`CatalogError::BranchNotFound`].
    pub(crate) fn storage(repository: &str, branch: &str, source: StoreError) -> Self {
        if source.is_not_found() {
            return Self::BranchNotFound {
                repository: repository.to_string(),
                branch: branch.to_string(),
            };
        }
        Self::Storage {
            repository: repository.to_string(),
            branch: branch.to_string(),
            source,
        }
    }

    pub(crate) fn diff(repository: &str, branch: &str, err: DiffError) -> Self {
        match err {
            DiffError::BranchNotFound(branch) => Self::BranchNotFound {
                repository: repository.to_string(),
                branch,
            },
            DiffError::Store(source) => Self::Storage {
                repository: repository.to_string(),
                branch: branch.to_string(),
                source,
            },
        }
    }

    pub(crate) fn transaction(repository: &str, source: StoreError) -> Self {
        Self::Transaction {
            repository: repository.to_string(),
            source,
        }
    }

    /// Returns `true` for a missing branch or entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BranchNotFound { .. } | Self::EntryNotFound { .. })
    }
}

/// Convenience alias for catalog results.
pub type CatalogResult<T> = Result<T, CatalogError>;
