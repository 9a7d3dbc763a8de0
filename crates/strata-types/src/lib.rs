//! Foundation types for Strata.
//!
//! Strata layers git-like versioning over an object-storage data lake. This
//! crate holds the data model every other Strata crate shares.
//!
//! # Key Types
//!
//! - [`Address`] -- Content address of a committed tree node
//! - [`Entry`] -- Immutable tree node with a precomputed object count
//! - [`WorkspaceEntry`] -- Staged change (new content or tombstones) on a branch
//! - [`Branch`] / [`BranchId`] / [`LockType`] -- Branch pointer and lock intents
//! - [`Difference`] / [`Differences`] -- Diff engine output

pub mod address;
pub mod branch;
pub mod difference;
pub mod entry;
pub mod path;

pub use address::Address;
pub use branch::{Branch, BranchId, LockType};
pub use difference::{Difference, DifferenceDirection, DifferenceType, Differences};
pub use entry::{Entry, EntryType, WorkspaceEntry};
