//! Tree entries (committed) and workspace entries (staged).

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::path;

/// What a path represents: a directory or a leaf object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Directory.
    Tree,
    /// Leaf object.
    Object,
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tree => write!(f, "tree"),
            Self::Object => write!(f, "object"),
        }
    }
}

/// An immutable node of a committed tree, keyed by (parent address, name).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Content address of this node.
    pub address: Address,
    /// Name within the parent directory.
    pub name: String,
    /// Directory or object.
    pub entry_type: EntryType,
    /// Checksum of the object bytes. `None` for trees.
    pub checksum: Option<String>,
    /// Number of objects transitively under this node.
    ///
    /// Precomputed at commit time. Objects count themselves (`1`), so a
    /// parent can compare a staged tombstone count against any child.
    pub object_count: u64,
}

impl Entry {
    /// A leaf object entry.
    pub fn object(address: Address, name: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            entry_type: EntryType::Object,
            checksum: Some(checksum.into()),
            object_count: 1,
        }
    }

    /// A directory entry covering `object_count` objects.
    pub fn tree(address: Address, name: impl Into<String>, object_count: u64) -> Self {
        Self {
            address,
            name: name.into(),
            entry_type: EntryType::Tree,
            checksum: None,
            object_count,
        }
    }
}

/// A staged, uncommitted change at a path on a branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceEntry {
    /// Full path relative to the branch root.
    pub path: String,
    /// Last path segment, joined against tree entry names.
    pub entry_name: String,
    /// What the path currently represents in the workspace.
    pub entry_type: EntryType,
    /// Checksum of newly staged content. `None` defers to the tree.
    pub entry_checksum: Option<String>,
    /// Deletion markers accumulated under this path.
    pub tombstone_count: u64,
}

impl WorkspaceEntry {
    /// Stage new content for an object.
    pub fn object(path: impl Into<String>, checksum: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            entry_name: path::entry_name(&path).to_string(),
            path,
            entry_type: EntryType::Object,
            entry_checksum: Some(checksum.into()),
            tombstone_count: 0,
        }
    }

    /// Stage the deletion of an object.
    pub fn tombstone(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            entry_name: path::entry_name(&path).to_string(),
            path,
            entry_type: EntryType::Object,
            entry_checksum: None,
            tombstone_count: 1,
        }
    }

    /// Stage a directory carrying `tombstone_count` deletions beneath it.
    pub fn directory(path: impl Into<String>, tombstone_count: u64) -> Self {
        let path = path.into();
        Self {
            entry_name: path::entry_name(&path).to_string(),
            path,
            entry_type: EntryType::Tree,
            entry_checksum: None,
            tombstone_count,
        }
    }

    /// Returns `true` if at least one deletion is recorded at this path.
    pub fn is_tombstoned(&self) -> bool {
        self.tombstone_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objects_count_themselves() {
        let e = Entry::object(Address::from_hash([1; 32]), "x.csv", "abc");
        assert_eq!(e.object_count, 1);
        assert_eq!(e.checksum.as_deref(), Some("abc"));
        assert_eq!(e.entry_type, EntryType::Object);
    }

    #[test]
    fn workspace_constructors_derive_entry_name() {
        assert_eq!(WorkspaceEntry::object("a/b/c.csv", "x").entry_name, "c.csv");
        assert_eq!(WorkspaceEntry::directory("a/b/", 3).entry_name, "b/");
        let t = WorkspaceEntry::tombstone("a/gone.csv");
        assert_eq!(t.entry_name, "gone.csv");
        assert!(t.is_tombstoned());
        assert!(t.entry_checksum.is_none());
    }

    #[test]
    fn entry_type_serializes_lowercase() {
        let json = serde_json::to_string(&EntryType::Object).unwrap();
        assert_eq!(json, "\"object\"");
        assert_eq!(EntryType::Tree.to_string(), "tree");
    }
}
