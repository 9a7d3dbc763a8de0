use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Internal identifier of a branch, used as the key of staged rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchId(pub i64);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, mutable pointer to the root tree of its last commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Internal identifier.
    pub id: BranchId,
    /// Human-readable branch name (e.g. "main").
    pub name: String,
    /// Address of the tree representing the last commit.
    pub commit_root: Address,
}

/// Lock intent taken on a branch for the duration of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockType {
    /// Point edits: many holders may proceed concurrently.
    Shared,
    /// Structural changes (commit, reset): excludes every other holder.
    Exclusive,
}

impl fmt::Display for LockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => write!(f, "shared"),
            Self::Exclusive => write!(f, "exclusive"),
        }
    }
}
