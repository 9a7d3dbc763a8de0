//! Versioned entry storage for Strata.
//!
//! Committed state is a content-addressed merkle tree whose nodes are keyed by
//! `(parent address, name)`. Uncommitted state is a set of staged rows per
//! branch. Both are read through repository-scoped, snapshot-isolated
//! transactions.
//!
//! # Interfaces
//!
//! - [`TreeReader`] -- branch heads and immutable tree nodes
//! - [`WorkspaceReader`] / [`WorkspaceWriter`] -- staged rows, listed per directory
//! - [`BranchLocker`] -- shared/exclusive branch locks held until the transaction ends
//! - [`RepoTransaction`] / [`Transactor`] -- snapshot-isolated units of work
//!
//! # Implementations
//!
//! - [`InMemoryCatalogStore`] -- persistent-collection store for tests and embedding
//! - [`TreeBuilder`] -- commit-time tree materialization with object counts
//!
//! # Design Rules
//!
//! 1. Tree nodes are immutable once written.
//! 2. Every read inside a transaction observes the snapshot taken at begin.
//! 3. Writes become visible atomically at commit, or not at all.
//! 4. "Not found" is an expected outcome and is reported as
//!    [`StoreError::NotFound`], distinct from backend failures.

pub mod error;
pub mod memory;
pub mod traits;
pub mod tree;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryCatalogStore, InMemoryTransaction, OPEN_MAX_COMMIT, UNCOMMITTED};
pub use traits::{
    BranchLocker, ListOptions, RepoTransaction, Transactor, TreeReader, TxOptions, WorkspacePage,
    WorkspaceReader, WorkspaceWriter,
};
pub use tree::{empty_tree_address, CommittedTree, TreeBuilder};
