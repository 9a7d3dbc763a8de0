//! In-memory catalog store with snapshot-isolated transactions.
//!
//! [`InMemoryCatalogStore`] keeps one versioned state per repository in
//! persistent (`im`) collections, so taking a snapshot at `begin` is a cheap
//! clone. Transactions read their snapshot plus their own buffered writes and
//! publish those writes on commit with first-committer-wins conflict
//! detection. Branch locks are tokio `RwLock`s held by the transaction until
//! it ends.
//!
//! Staged rows follow the entries-table layout: keyed by
//! `(branch_id, path, min_commit)` where `min_commit == 0` marks a row that
//! has not been committed yet. Object counts are not stored per row; they
//! live on the committed tree nodes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock as BranchLock};
use tracing::debug;

use strata_types::path::is_immediate_child;
use strata_types::{Address, Branch, BranchId, Entry, EntryType, LockType, WorkspaceEntry};

use crate::error::{StoreError, StoreResult};
use crate::traits::{
    BranchLocker, ListOptions, RepoTransaction, Transactor, TreeReader, TxOptions, WorkspacePage,
    WorkspaceReader, WorkspaceWriter,
};
use crate::tree::CommittedTree;

/// `min_commit` of a staged, uncommitted row.
pub const UNCOMMITTED: u64 = 0;

/// `max_commit` of a row that is still visible at the branch head.
pub const OPEN_MAX_COMMIT: u64 = u64::MAX;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct EntryKey {
    branch_id: BranchId,
    path: String,
    min_commit: u64,
}

impl EntryKey {
    fn uncommitted(branch_id: BranchId, path: &str) -> Self {
        Self {
            branch_id,
            path: path.to_string(),
            min_commit: UNCOMMITTED,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct EntryRow {
    entry_type: EntryType,
    checksum: Option<String>,
    min_commit: u64,
    max_commit: u64,
    tombstone_count: u64,
    /// State version that last wrote this row.
    version: u64,
}

impl EntryRow {
    fn is_staged(&self) -> bool {
        self.min_commit == UNCOMMITTED && self.max_commit == OPEN_MAX_COMMIT
    }

    fn to_workspace_entry(&self, path: &str) -> WorkspaceEntry {
        WorkspaceEntry {
            path: path.to_string(),
            entry_name: strata_types::path::entry_name(path).to_string(),
            entry_type: self.entry_type,
            entry_checksum: self.checksum.clone(),
            tombstone_count: self.tombstone_count,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct RepoState {
    version: u64,
    next_branch_id: i64,
    branches: im::OrdMap<String, Branch>,
    tree: im::HashMap<(Address, String), Entry>,
    entries: im::OrdMap<EntryKey, EntryRow>,
}

impl RepoState {
    fn branch(&self, name: &str) -> StoreResult<&Branch> {
        self.branches
            .get(name)
            .ok_or_else(|| StoreError::NotFound(format!("branch {name}")))
    }
}

#[derive(Debug, Default)]
struct RepoHandle {
    state: RwLock<RepoState>,
    branch_locks: Mutex<HashMap<BranchId, Arc<BranchLock<()>>>>,
}

impl RepoHandle {
    fn snapshot(&self) -> StoreResult<RepoState> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.clone())
    }

    fn branch_lock(&self, id: BranchId) -> StoreResult<Arc<BranchLock<()>>> {
        let mut locks = self.branch_locks.lock().map_err(|_| poisoned())?;
        Ok(locks
            .entry(id)
            .or_insert_with(|| Arc::new(BranchLock::new(())))
            .clone())
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("repository state lock poisoned".into())
}

/// In-memory, snapshot-isolated catalog store.
///
/// Intended for tests and embedding. Besides the [`Transactor`] interface it
/// exposes the commit-time and administrative operations the catalog core
/// treats as external: creating repositories and branches, and publishing
/// committed trees.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    repos: RwLock<HashMap<String, Arc<RepoHandle>>>,
}

impl InMemoryCatalogStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn repo(&self, repository: &str) -> StoreResult<Arc<RepoHandle>> {
        let repos = self.repos.read().map_err(|_| poisoned())?;
        repos
            .get(repository)
            .cloned()
            .ok_or_else(|| StoreError::RepositoryNotFound(repository.to_string()))
    }

    fn mutate<T>(&self, repository: &str, f: impl FnOnce(&mut RepoState) -> StoreResult<T>) -> StoreResult<T> {
        let handle = self.repo(repository)?;
        let mut state = handle.state.write().map_err(|_| poisoned())?;
        let mut next = state.clone();
        let out = f(&mut next)?;
        next.version += 1;
        *state = next;
        Ok(out)
    }

    /// Register an empty repository.
    pub fn create_repository(&self, repository: &str) -> StoreResult<()> {
        let mut repos = self.repos.write().map_err(|_| poisoned())?;
        if repos.contains_key(repository) {
            return Err(StoreError::AlreadyExists(format!("repository {repository}")));
        }
        repos.insert(repository.to_string(), Arc::new(RepoHandle::default()));
        Ok(())
    }

    /// Create a branch pointing at `commit_root`.
    pub fn create_branch(&self, repository: &str, branch: &str, commit_root: Address) -> StoreResult<BranchId> {
        self.mutate(repository, |state| {
            if state.branches.contains_key(branch) {
                return Err(StoreError::AlreadyExists(format!("branch {branch}")));
            }
            state.next_branch_id += 1;
            let id = BranchId(state.next_branch_id);
            state.branches.insert(
                branch.to_string(),
                Branch {
                    id,
                    name: branch.to_string(),
                    commit_root,
                },
            );
            Ok(id)
        })
    }

    /// Store the nodes of a committed tree and move `branch` to its root.
    ///
    /// Folding staged rows into the commit is the committer's concern; staged
    /// rows are left untouched.
    pub fn commit_tree(&self, repository: &str, branch: &str, tree: &CommittedTree) -> StoreResult<()> {
        self.mutate(repository, |state| {
            let mut head = state.branch(branch)?.clone();
            for (parent, entry) in &tree.nodes {
                state
                    .tree
                    .insert((*parent, entry.name.clone()), entry.clone());
            }
            head.commit_root = tree.root;
            state.branches.insert(branch.to_string(), head);
            Ok(())
        })
    }

    /// Record a committed row in the entries table (`min_commit > 0`).
    pub fn record_committed_entry(
        &self,
        repository: &str,
        branch: &str,
        min_commit: u64,
        entry: &WorkspaceEntry,
    ) -> StoreResult<()> {
        if min_commit == UNCOMMITTED {
            return Err(StoreError::Backend(
                "committed rows need a non-zero min_commit".into(),
            ));
        }
        self.mutate(repository, |state| {
            let branch_id = state.branch(branch)?.id;
            let version = state.version + 1;
            state.entries.insert(
                EntryKey {
                    branch_id,
                    path: entry.path.clone(),
                    min_commit,
                },
                EntryRow {
                    entry_type: entry.entry_type,
                    checksum: entry.entry_checksum.clone(),
                    min_commit,
                    max_commit: OPEN_MAX_COMMIT,
                    tombstone_count: entry.tombstone_count,
                    version,
                },
            );
            Ok(())
        })
    }

    /// Number of rows for `path` on `branch`, committed or not.
    pub fn row_count(&self, repository: &str, branch: &str, path: &str) -> StoreResult<usize> {
        let state = self.repo(repository)?.snapshot()?;
        let branch_id = state.branch(branch)?.id;
        Ok(state
            .entries
            .keys()
            .filter(|k| k.branch_id == branch_id && k.path == path)
            .count())
    }

    /// Stage `entry` on `branch` in its own transaction.
    pub async fn stage(&self, repository: &str, branch: &str, entry: WorkspaceEntry) -> StoreResult<()> {
        let mut tx = self.begin(repository, TxOptions::read_write()).await?;
        let branch_id = tx.lock_branch(branch, LockType::Shared).await?;
        tx.upsert_uncommitted_entry(branch_id, &entry).await?;
        tx.commit().await
    }
}

#[async_trait]
impl Transactor for InMemoryCatalogStore {
    async fn begin(&self, repository: &str, options: TxOptions) -> StoreResult<Box<dyn RepoTransaction>> {
        let handle = self.repo(repository)?;
        let snapshot = handle.snapshot()?;
        debug!(
            repository,
            version = snapshot.version,
            read_only = options.read_only,
            "transaction begin"
        );
        Ok(Box::new(InMemoryTransaction {
            repository: repository.to_string(),
            handle,
            base: snapshot.clone(),
            working: snapshot,
            writes: Vec::new(),
            guards: Vec::new(),
            read_only: options.read_only,
            finished: false,
        }))
    }
}

#[derive(Debug)]
enum PendingWrite {
    Upsert(EntryKey, EntryRow),
    Delete(EntryKey),
}

impl PendingWrite {
    fn key(&self) -> &EntryKey {
        match self {
            Self::Upsert(key, _) | Self::Delete(key) => key,
        }
    }
}

#[derive(Debug)]
enum BranchGuard {
    Shared { _guard: OwnedRwLockReadGuard<()> },
    Exclusive { _guard: OwnedRwLockWriteGuard<()> },
}

/// A transaction over an [`InMemoryCatalogStore`] repository.
#[derive(Debug)]
pub struct InMemoryTransaction {
    repository: String,
    handle: Arc<RepoHandle>,
    /// Snapshot taken at begin; used for conflict detection.
    base: RepoState,
    /// Snapshot plus this transaction's own writes.
    working: RepoState,
    writes: Vec<PendingWrite>,
    guards: Vec<BranchGuard>,
    read_only: bool,
    finished: bool,
}

impl InMemoryTransaction {
    fn ensure_open(&self) -> StoreResult<()> {
        if self.finished {
            return Err(StoreError::TransactionClosed);
        }
        Ok(())
    }

    fn ensure_writable(&self) -> StoreResult<()> {
        self.ensure_open()?;
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }

    fn publish(&mut self) -> StoreResult<u64> {
        let mut state = self.handle.state.write().map_err(|_| poisoned())?;
        for write in &self.writes {
            let key = write.key();
            let seen = self.base.entries.get(key).map(|r| r.version);
            let current = state.entries.get(key).map(|r| r.version);
            if seen != current {
                return Err(StoreError::SerializationFailure(format!(
                    "row {} on branch {} changed concurrently",
                    key.path, key.branch_id
                )));
            }
        }

        let mut next = state.clone();
        next.version += 1;
        for write in self.writes.drain(..) {
            match write {
                PendingWrite::Upsert(key, mut row) => {
                    row.version = next.version;
                    next.entries.insert(key, row);
                }
                PendingWrite::Delete(key) => {
                    next.entries.remove(&key);
                }
            }
        }
        let version = next.version;
        *state = next;
        Ok(version)
    }
}

#[async_trait]
impl TreeReader for InMemoryTransaction {
    async fn read_branch(&self, branch: &str) -> StoreResult<Branch> {
        self.ensure_open()?;
        self.working.branch(branch).cloned()
    }

    async fn read_tree_entry(&self, parent: &Address, name: &str) -> StoreResult<Entry> {
        self.ensure_open()?;
        self.working
            .tree
            .get(&(*parent, name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("tree entry {name:?} under {}", parent.short_hex())))
    }
}

#[async_trait]
impl WorkspaceReader for InMemoryTransaction {
    async fn list_workspace_directory(
        &self,
        branch: &str,
        prefix: &str,
        options: &ListOptions,
    ) -> StoreResult<WorkspacePage> {
        self.ensure_open()?;
        let branch_id = self.working.branch(branch)?.id;
        let marker = match (options.after.as_deref(), options.page_token.as_deref()) {
            (Some(a), Some(t)) => Some(a.max(t)),
            (a, t) => a.or(t),
        };

        let start = EntryKey::uncommitted(branch_id, prefix);
        let mut children = self
            .working
            .entries
            .range(start..)
            .take_while(|(k, _)| k.branch_id == branch_id && k.path.starts_with(prefix))
            .filter(|(k, row)| row.is_staged() && is_immediate_child(prefix, &k.path))
            .filter(|(k, _)| marker.map_or(true, |m| k.path.as_str() > m));

        let mut entries = Vec::new();
        let mut next_page_token = None;
        match options.limit {
            None => entries.extend(children.map(|(k, row)| row.to_workspace_entry(&k.path))),
            Some(limit) => {
                entries.extend(
                    children
                        .by_ref()
                        .take(limit)
                        .map(|(k, row)| row.to_workspace_entry(&k.path)),
                );
                if children.next().is_some() {
                    next_page_token = entries.last().map(|e| e.path.clone());
                }
            }
        }
        Ok(WorkspacePage {
            entries,
            next_page_token,
        })
    }
}

#[async_trait]
impl WorkspaceWriter for InMemoryTransaction {
    async fn upsert_uncommitted_entry(&mut self, branch_id: BranchId, entry: &WorkspaceEntry) -> StoreResult<()> {
        self.ensure_writable()?;
        if entry.path.is_empty() {
            return Err(StoreError::InvalidPath {
                path: entry.path.clone(),
                reason: "staged paths must be non-empty".into(),
            });
        }
        let key = EntryKey::uncommitted(branch_id, &entry.path);
        let row = EntryRow {
            entry_type: entry.entry_type,
            checksum: entry.entry_checksum.clone(),
            min_commit: UNCOMMITTED,
            max_commit: OPEN_MAX_COMMIT,
            tombstone_count: entry.tombstone_count,
            version: self.working.version,
        };
        self.working.entries.insert(key.clone(), row.clone());
        self.writes.push(PendingWrite::Upsert(key, row));
        Ok(())
    }

    async fn delete_uncommitted_entry(&mut self, branch_id: BranchId, path: &str) -> StoreResult<u64> {
        self.ensure_writable()?;
        let key = EntryKey::uncommitted(branch_id, path);
        if self.working.entries.remove(&key).is_none() {
            return Ok(0);
        }
        self.writes.push(PendingWrite::Delete(key));
        Ok(1)
    }
}

#[async_trait]
impl BranchLocker for InMemoryTransaction {
    async fn lock_branch(&mut self, branch: &str, lock: LockType) -> StoreResult<BranchId> {
        self.ensure_open()?;
        let branch_id = self.working.branch(branch)?.id;
        let branch_lock = self.handle.branch_lock(branch_id)?;
        let guard = match lock {
            LockType::Shared => BranchGuard::Shared {
                _guard: branch_lock.read_owned().await,
            },
            LockType::Exclusive => BranchGuard::Exclusive {
                _guard: branch_lock.write_owned().await,
            },
        };
        self.guards.push(guard);
        debug!(repository = %self.repository, branch, %branch_id, %lock, "branch locked");
        Ok(branch_id)
    }
}

#[async_trait]
impl RepoTransaction for InMemoryTransaction {
    fn repository(&self) -> &str {
        &self.repository
    }

    async fn commit(&mut self) -> StoreResult<()> {
        self.ensure_open()?;
        self.finished = true;
        let writes = self.writes.len();
        let result = if writes == 0 {
            Ok(self.base.version)
        } else {
            self.publish()
        };
        self.writes.clear();
        self.guards.clear();
        let version = result?;
        debug!(repository = %self.repository, writes, version, "transaction commit");
        Ok(())
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        self.ensure_open()?;
        self.finished = true;
        let discarded = self.writes.len();
        self.writes.clear();
        self.guards.clear();
        debug!(repository = %self.repository, discarded, "transaction rollback");
        Ok(())
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                repository = %self.repository,
                discarded = self.writes.len(),
                "transaction dropped before commit"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{empty_tree_address, TreeBuilder};

    const REPO: &str = "lake";
    const BRANCH: &str = "main";

    fn store_with_tree(objects: &[(&str, &str)]) -> InMemoryCatalogStore {
        let store = InMemoryCatalogStore::new();
        store.create_repository(REPO).unwrap();
        store
            .create_branch(REPO, BRANCH, empty_tree_address())
            .unwrap();
        let tree = TreeBuilder::from_objects(objects.iter().copied())
            .unwrap()
            .build();
        store.commit_tree(REPO, BRANCH, &tree).unwrap();
        store
    }

    async fn list(store: &InMemoryCatalogStore, prefix: &str, options: ListOptions) -> WorkspacePage {
        let tx = store.begin(REPO, TxOptions::read_only()).await.unwrap();
        tx.list_workspace_directory(BRANCH, prefix, &options)
            .await
            .unwrap()
    }

    fn paths(page: &WorkspacePage) -> Vec<&str> {
        page.entries.iter().map(|e| e.path.as_str()).collect()
    }

    // -----------------------------------------------------------------------
    // Repository and branch administration
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn begin_on_unknown_repository_fails() {
        let store = InMemoryCatalogStore::new();
        let err = store
            .begin("missing", TxOptions::read_only())
            .await
            .err()
            .expect("begin should fail");
        assert!(matches!(err, StoreError::RepositoryNotFound(_)));
    }

    #[test]
    fn duplicate_repository_and_branch_are_rejected() {
        let store = store_with_tree(&[]);
        assert!(matches!(
            store.create_repository(REPO),
            Err(StoreError::AlreadyExists(_))
        ));
        assert!(matches!(
            store.create_branch(REPO, BRANCH, empty_tree_address()),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn reads_committed_tree_nodes() {
        let store = store_with_tree(&[("a/x.csv", "1")]);
        let tx = store.begin(REPO, TxOptions::read_only()).await.unwrap();
        let head = tx.read_branch(BRANCH).await.unwrap();
        let dir = tx.read_tree_entry(&head.commit_root, "a/").await.unwrap();
        assert_eq!(dir.object_count, 1);
        let missing = tx.read_tree_entry(&head.commit_root, "b/").await.unwrap_err();
        assert!(missing.is_not_found());
        assert!(tx.read_branch("dev").await.unwrap_err().is_not_found());
    }

    // -----------------------------------------------------------------------
    // Workspace listing
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn listing_returns_immediate_children_in_path_order() {
        let store = store_with_tree(&[]);
        for entry in [
            WorkspaceEntry::object("a/z.csv", "1"),
            WorkspaceEntry::directory("a/b/", 0),
            WorkspaceEntry::object("a/b/deep.csv", "2"),
            WorkspaceEntry::object("a/m.csv", "3"),
            WorkspaceEntry::object("top.csv", "4"),
        ] {
            store.stage(REPO, BRANCH, entry).await.unwrap();
        }

        let root = list(&store, "", ListOptions::full_scan()).await;
        assert_eq!(paths(&root), vec!["top.csv"]);

        let a = list(&store, "a/", ListOptions::full_scan()).await;
        assert_eq!(paths(&a), vec!["a/b/", "a/m.csv", "a/z.csv"]);
        assert_eq!(a.entries[0].entry_name, "b/");
        assert!(a.next_page_token.is_none());
    }

    #[tokio::test]
    async fn listing_pages_with_tokens() {
        let store = store_with_tree(&[]);
        for name in ["d/1", "d/2", "d/3", "d/4", "d/5"] {
            store
                .stage(REPO, BRANCH, WorkspaceEntry::object(name, "x"))
                .await
                .unwrap();
        }

        let first = list(&store, "d/", ListOptions::paged(2)).await;
        assert_eq!(paths(&first), vec!["d/1", "d/2"]);
        assert_eq!(first.next_page_token.as_deref(), Some("d/2"));

        let second = list(
            &store,
            "d/",
            ListOptions::paged(2).with_page_token(first.next_page_token.clone()),
        )
        .await;
        assert_eq!(paths(&second), vec!["d/3", "d/4"]);

        let third = list(
            &store,
            "d/",
            ListOptions::paged(2).with_page_token(second.next_page_token.clone()),
        )
        .await;
        assert_eq!(paths(&third), vec!["d/5"]);
        assert!(third.next_page_token.is_none());

        let after = ListOptions {
            after: Some("d/3".into()),
            ..ListOptions::default()
        };
        assert_eq!(paths(&list(&store, "d/", after).await), vec!["d/4", "d/5"]);
    }

    #[tokio::test]
    async fn listing_skips_committed_rows() {
        let store = store_with_tree(&[]);
        store
            .record_committed_entry(REPO, BRANCH, 7, &WorkspaceEntry::object("old.csv", "1"))
            .unwrap();
        let page = list(&store, "", ListOptions::full_scan()).await;
        assert!(page.entries.is_empty());
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn snapshot_hides_later_commits() {
        let store = store_with_tree(&[]);
        let reader = store.begin(REPO, TxOptions::read_only()).await.unwrap();

        store
            .stage(REPO, BRANCH, WorkspaceEntry::object("new.csv", "1"))
            .await
            .unwrap();

        let stale = reader
            .list_workspace_directory(BRANCH, "", &ListOptions::full_scan())
            .await
            .unwrap();
        assert!(stale.entries.is_empty());
        assert_eq!(paths(&list(&store, "", ListOptions::full_scan()).await), vec!["new.csv"]);
    }

    #[tokio::test]
    async fn transaction_sees_its_own_writes() {
        let store = store_with_tree(&[]);
        let mut tx = store.begin(REPO, TxOptions::read_write()).await.unwrap();
        let id = tx.lock_branch(BRANCH, LockType::Shared).await.unwrap();
        tx.upsert_uncommitted_entry(id, &WorkspaceEntry::object("x.csv", "1"))
            .await
            .unwrap();
        let page = tx
            .list_workspace_directory(BRANCH, "", &ListOptions::full_scan())
            .await
            .unwrap();
        assert_eq!(paths(&page), vec!["x.csv"]);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = store_with_tree(&[]);
        {
            let mut tx = store.begin(REPO, TxOptions::read_write()).await.unwrap();
            let id = tx.lock_branch(BRANCH, LockType::Shared).await.unwrap();
            tx.upsert_uncommitted_entry(id, &WorkspaceEntry::object("x.csv", "1"))
                .await
                .unwrap();
        }
        assert!(list(&store, "", ListOptions::full_scan()).await.entries.is_empty());
    }

    #[tokio::test]
    async fn rollback_discards_writes_and_closes() {
        let store = store_with_tree(&[]);
        let mut tx = store.begin(REPO, TxOptions::read_write()).await.unwrap();
        let id = tx.lock_branch(BRANCH, LockType::Shared).await.unwrap();
        tx.upsert_uncommitted_entry(id, &WorkspaceEntry::object("x.csv", "1"))
            .await
            .unwrap();
        tx.rollback().await.unwrap();
        assert!(matches!(tx.commit().await, Err(StoreError::TransactionClosed)));
        assert!(list(&store, "", ListOptions::full_scan()).await.entries.is_empty());
    }

    #[tokio::test]
    async fn read_only_transactions_reject_writes() {
        let store = store_with_tree(&[]);
        let mut tx = store.begin(REPO, TxOptions::read_only()).await.unwrap();
        let id = tx.lock_branch(BRANCH, LockType::Shared).await.unwrap();
        let err = tx
            .delete_uncommitted_entry(id, "x.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ReadOnly));
    }

    #[tokio::test]
    async fn delete_only_touches_uncommitted_rows() {
        let store = store_with_tree(&[]);
        store
            .record_committed_entry(REPO, BRANCH, 3, &WorkspaceEntry::object("x.csv", "old"))
            .unwrap();
        store
            .stage(REPO, BRANCH, WorkspaceEntry::object("x.csv", "new"))
            .await
            .unwrap();
        assert_eq!(store.row_count(REPO, BRANCH, "x.csv").unwrap(), 2);

        let mut tx = store.begin(REPO, TxOptions::read_write()).await.unwrap();
        let id = tx.lock_branch(BRANCH, LockType::Shared).await.unwrap();
        assert_eq!(tx.delete_uncommitted_entry(id, "x.csv").await.unwrap(), 1);
        assert_eq!(tx.delete_uncommitted_entry(id, "x.csv").await.unwrap(), 0);
        tx.commit().await.unwrap();

        assert_eq!(store.row_count(REPO, BRANCH, "x.csv").unwrap(), 1);
    }

    #[tokio::test]
    async fn first_committer_wins() {
        let store = store_with_tree(&[]);
        store
            .stage(REPO, BRANCH, WorkspaceEntry::object("x.csv", "1"))
            .await
            .unwrap();

        let mut a = store.begin(REPO, TxOptions::read_write()).await.unwrap();
        let mut b = store.begin(REPO, TxOptions::read_write()).await.unwrap();
        let id_a = a.lock_branch(BRANCH, LockType::Shared).await.unwrap();
        let id_b = b.lock_branch(BRANCH, LockType::Shared).await.unwrap();
        assert_eq!(a.delete_uncommitted_entry(id_a, "x.csv").await.unwrap(), 1);
        assert_eq!(b.delete_uncommitted_entry(id_b, "x.csv").await.unwrap(), 1);

        a.commit().await.unwrap();
        let err = b.commit().await.unwrap_err();
        assert!(matches!(err, StoreError::SerializationFailure(_)));
    }

    #[tokio::test]
    async fn exclusive_lock_waits_for_shared_holders() {
        let store = Arc::new(store_with_tree(&[]));
        let mut shared = store.begin(REPO, TxOptions::read_write()).await.unwrap();
        shared.lock_branch(BRANCH, LockType::Shared).await.unwrap();

        let contender = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut tx = store.begin(REPO, TxOptions::read_write()).await.unwrap();
                tx.lock_branch(BRANCH, LockType::Exclusive).await.unwrap();
                tx.commit().await.unwrap();
            })
        };

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        shared.commit().await.unwrap();
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn shared_locks_do_not_block_each_other() {
        let store = store_with_tree(&[]);
        let mut a = store.begin(REPO, TxOptions::read_write()).await.unwrap();
        let mut b = store.begin(REPO, TxOptions::read_write()).await.unwrap();
        a.lock_branch(BRANCH, LockType::Shared).await.unwrap();
        b.lock_branch(BRANCH, LockType::Shared).await.unwrap();
        a.commit().await.unwrap();
        b.commit().await.unwrap();
    }
}
