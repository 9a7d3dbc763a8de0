//! The catalog's inbound operations.

use std::sync::Arc;

use strata_diff::DiffOptions;
use strata_store::{RepoTransaction, Transactor, TxOptions};
use strata_types::{Differences, LockType};
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::coordinator::TransactionCoordinator;
use crate::error::{CatalogError, CatalogResult};
use crate::names::{validate_branch_name, validate_path, validate_repository_name};

/// Entry point for workspace diffs and staged-entry reverts.
///
/// Every operation validates its identifiers, then runs as one repository
/// transaction through the [`TransactionCoordinator`].
#[derive(Clone, Debug)]
pub struct Cataloger {
    coordinator: TransactionCoordinator,
    config: CatalogConfig,
}

impl Cataloger {
    /// Build a cataloger over `transactor`.
    ///
    /// Fails with [`CatalogError::Config`] if `config` does not validate.
    pub fn new(transactor: Arc<dyn Transactor>, config: CatalogConfig) -> CatalogResult<Self> {
        config.validate()?;
        Ok(Self {
            coordinator: TransactionCoordinator::new(transactor, config.transaction_timeout),
            config,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Report how the workspace of `branch` differs from its last commit.
    ///
    /// Runs in a read-only transaction and takes no branch lock; every read
    /// observes the snapshot taken when the transaction began.
    pub async fn diff_workspace(&self, repository: &str, branch: &str) -> CatalogResult<Differences> {
        validate_repository_name(repository)?;
        validate_branch_name(branch)?;

        let options = DiffOptions {
            page_size: self.config.diff_page_size,
        };
        let result = self
            .coordinator
            .run_in_repository_transaction(repository, TxOptions::read_only(), move |tx| async move {
                let result = strata_diff::diff_workspace(&*tx, branch, &options)
                    .await
                    .map_err(|e| CatalogError::diff(repository, branch, e));
                (tx, result)
            })
            .await;

        match &result {
            Ok(differences) => debug!(
                repository,
                branch,
                differences = differences.len(),
                "diff workspace"
            ),
            Err(e) => warn!(repository, branch, error = %e, "diff workspace failed"),
        }
        result
    }

    /// Discard the staged (uncommitted) entry at `path`.
    ///
    /// Holds a shared lock on the branch for the duration of the
    /// transaction. Committed history is never touched. Fails with
    /// [`CatalogError::EntryNotFound`] if nothing is staged at `path`.
    pub async fn revert_entry(&self, repository: &str, branch: &str, path: &str) -> CatalogResult<()> {
        validate_repository_name(repository)?;
        validate_branch_name(branch)?;
        validate_path(path)?;

        let result = self
            .coordinator
            .run_in_repository_transaction(repository, TxOptions::read_write(), move |mut tx| async move {
                let result = revert_staged(&mut *tx, repository, branch, path).await;
                (tx, result)
            })
            .await;

        match &result {
            Ok(()) => info!(repository, branch, path, "reverted staged entry"),
            Err(e) if e.is_not_found() => debug!(repository, branch, path, error = %e, "revert entry"),
            Err(e) => warn!(repository, branch, path, error = %e, "revert entry failed"),
        }
        result
    }
}

async fn revert_staged(
    tx: &mut dyn RepoTransaction,
    repository: &str,
    branch: &str,
    path: &str,
) -> CatalogResult<()> {
    let branch_id = tx
        .lock_branch(branch, LockType::Shared)
        .await
        .map_err(|e| CatalogError::storage(repository, branch, e))?;

    let removed = tx
        .delete_uncommitted_entry(branch_id, path)
        .await
        .map_err(|source| CatalogError::Storage {
            repository: repository.to_string(),
            branch: branch.to_string(),
            source,
        })?;

    match removed {
        1 => Ok(()),
        0 => Err(CatalogError::EntryNotFound {
            repository: repository.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
        }),
        n => Err(CatalogError::ConsistencyViolation(format!(
            "revert of {path} on {repository}/{branch} removed {n} staged rows"
        ))),
    }
}
