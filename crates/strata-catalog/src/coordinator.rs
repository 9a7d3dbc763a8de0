//! Repository-scoped units of work.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use strata_store::{RepoTransaction, Transactor, TxOptions};
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};

/// Runs closures inside repository transactions with a bounded lifetime.
///
/// The closure receives the transaction by value and hands it back together
/// with its result. `Ok` commits, `Err` rolls back. If the timeout fires
/// first, the in-flight future is dropped along with the transaction, which
/// discards its buffered writes and releases its branch locks.
#[derive(Clone)]
pub struct TransactionCoordinator {
    transactor: Arc<dyn Transactor>,
    timeout: Duration,
}

impl std::fmt::Debug for TransactionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionCoordinator")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl TransactionCoordinator {
    pub fn new(transactor: Arc<dyn Transactor>, timeout: Duration) -> Self {
        Self { transactor, timeout }
    }

    /// Upper bound on one unit of work.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `work` in a transaction on `repository`.
    pub async fn run_in_repository_transaction<T, F, Fut>(
        &self,
        repository: &str,
        options: TxOptions,
        work: F,
    ) -> CatalogResult<T>
    where
        F: FnOnce(Box<dyn RepoTransaction>) -> Fut + Send,
        Fut: Future<Output = (Box<dyn RepoTransaction>, CatalogResult<T>)> + Send,
        T: Send,
    {
        let unit = async {
            let tx = self
                .transactor
                .begin(repository, options)
                .await
                .map_err(|e| CatalogError::transaction(repository, e))?;

            let (mut tx, result) = work(tx).await;
            match result {
                Ok(value) => {
                    tx.commit()
                        .await
                        .map_err(|e| CatalogError::transaction(repository, e))?;
                    Ok(value)
                }
                Err(err) => {
                    if let Err(rollback) = tx.rollback().await {
                        warn!(repository, error = %rollback, "rollback failed");
                    }
                    Err(err)
                }
            }
        };

        match tokio::time::timeout(self.timeout, unit).await {
            Ok(result) => {
                debug!(
                    repository,
                    read_only = options.read_only,
                    ok = result.is_ok(),
                    "unit of work finished"
                );
                result
            }
            Err(_) => {
                warn!(
                    repository,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "transaction timed out, writes discarded"
                );
                Err(CatalogError::Timeout {
                    repository: repository.to_string(),
                    timeout: self.timeout,
                })
            }
        }
    }
}
