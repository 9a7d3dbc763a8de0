//! Storage interfaces consumed by the diff engine and the catalog.
//!
//! Every read goes through a [`RepoTransaction`], so all reads of one unit of
//! work observe the snapshot taken when the transaction began.

use async_trait::async_trait;
use strata_types::{Address, Branch, BranchId, Entry, LockType, WorkspaceEntry};

use crate::error::StoreResult;

/// Pagination controls for workspace directory listings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Only return entries whose path sorts strictly after this marker.
    pub after: Option<String>,
    /// Continuation token from a previous [`WorkspacePage`].
    pub page_token: Option<String>,
    /// Maximum entries per page. `None` scans the whole directory.
    pub limit: Option<usize>,
}

impl ListOptions {
    /// List every immediate child in one call.
    pub fn full_scan() -> Self {
        Self::default()
    }

    /// List at most `limit` children per page.
    pub fn paged(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Continue from a previous page.
    pub fn with_page_token(mut self, token: Option<String>) -> Self {
        self.page_token = token;
        self
    }
}

/// One page of a workspace directory listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkspacePage {
    /// Immediate staged children, ordered by path ascending.
    pub entries: Vec<WorkspaceEntry>,
    /// Set when more entries remain.
    pub next_page_token: Option<String>,
}

/// Options for opening a repository transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TxOptions {
    /// Reject writes for the lifetime of the transaction.
    pub read_only: bool,
}

impl TxOptions {
    pub fn read_only() -> Self {
        Self { read_only: true }
    }

    pub fn read_write() -> Self {
        Self { read_only: false }
    }
}

/// Read access to branches and immutable tree nodes.
#[async_trait]
pub trait TreeReader: Send + Sync {
    /// Read a branch by name. `StoreError::NotFound` if absent.
    async fn read_branch(&self, branch: &str) -> StoreResult<Branch>;

    /// Read the child `name` of the tree node at `parent`.
    ///
    /// Returns `StoreError::NotFound` if the parent has no such child.
    async fn read_tree_entry(&self, parent: &Address, name: &str) -> StoreResult<Entry>;
}

/// Read access to staged workspace entries.
#[async_trait]
pub trait WorkspaceReader: Send + Sync {
    /// List the immediate staged children of `prefix` on `branch`.
    ///
    /// Entries are ordered by path ascending. Listings are per directory,
    /// never transitive.
    async fn list_workspace_directory(
        &self,
        branch: &str,
        prefix: &str,
        options: &ListOptions,
    ) -> StoreResult<WorkspacePage>;
}

/// Point mutations on staged rows (`min_commit = 0`).
#[async_trait]
pub trait WorkspaceWriter: Send + Sync {
    /// Insert or replace the staged row for `entry.path`.
    async fn upsert_uncommitted_entry(
        &mut self,
        branch_id: BranchId,
        entry: &WorkspaceEntry,
    ) -> StoreResult<()>;

    /// Delete the staged row at `path`, returning the number of rows removed.
    async fn delete_uncommitted_entry(&mut self, branch_id: BranchId, path: &str) -> StoreResult<u64>;
}

/// Branch resolution under a lock held until the transaction ends.
#[async_trait]
pub trait BranchLocker: Send + Sync {
    /// Resolve `branch` to its identifier, acquiring `lock` on it.
    async fn lock_branch(&mut self, branch: &str, lock: LockType) -> StoreResult<BranchId>;
}

/// A snapshot-isolated unit of work scoped to one repository.
///
/// Writes are buffered until [`RepoTransaction::commit`]. Dropping a
/// transaction without committing discards its writes and releases its locks.
#[async_trait]
pub trait RepoTransaction: TreeReader + WorkspaceReader + WorkspaceWriter + BranchLocker {
    /// The repository this transaction is scoped to.
    fn repository(&self) -> &str;

    /// Atomically apply buffered writes and release locks.
    async fn commit(&mut self) -> StoreResult<()>;

    /// Discard buffered writes and release locks.
    async fn rollback(&mut self) -> StoreResult<()>;
}

/// Opens repository transactions.
#[async_trait]
pub trait Transactor: Send + Sync {
    /// Begin a transaction on `repository`.
    ///
    /// Returns `StoreError::RepositoryNotFound` if the repository is unknown.
    async fn begin(&self, repository: &str, options: TxOptions) -> StoreResult<Box<dyn RepoTransaction>>;
}
