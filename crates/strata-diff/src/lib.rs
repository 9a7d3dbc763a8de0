//! Merkle diff engine for Strata.
//!
//! Reconciles the staged entries of a branch's workspace against the tree of
//! its last commit and reports what changed, without visiting parts of the
//! tree that have no staged mutations.
//!
//! # Key Types
//!
//! - [`diff_workspace`] -- Workspace-vs-commit diff over one transaction snapshot
//! - [`DiffOptions`] -- Listing page size used while walking the workspace

pub mod error;
pub mod workspace_diff;

pub use error::{DiffError, DiffResult};
pub use workspace_diff::{diff_workspace, DiffOptions};
