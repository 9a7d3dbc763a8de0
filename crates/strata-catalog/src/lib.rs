//! Catalog services for Strata.
//!
//! The catalog exposes the operations that act on a branch's workspace: a
//! diff of staged changes against the last commit, and reverting a single
//! staged entry. Every operation validates its identifiers before reaching
//! storage and runs as one repository transaction with a bounded lifetime.
//!
//! # Key Types
//!
//! - [`Cataloger`] -- Inbound operations (`diff_workspace`, `revert_entry`)
//! - [`TransactionCoordinator`] -- Commit-on-success, rollback-on-error units of work
//! - [`CatalogConfig`] -- Transaction timeout and diff listing page size
//! - [`CatalogError`] / [`ValidationError`] -- Error taxonomy

pub mod cataloger;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod names;

pub use cataloger::Cataloger;
pub use config::CatalogConfig;
pub use coordinator::TransactionCoordinator;
pub use error::{CatalogError, CatalogResult, ValidationError};
