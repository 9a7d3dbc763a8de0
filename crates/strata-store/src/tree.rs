//! Commit-time materialization of merkle trees.
//!
//! [`TreeBuilder`] collects object paths and checksums and produces the
//! immutable tree nodes of a commit. Every directory node carries the number
//! of objects beneath it, computed bottom-up here so that readers never have
//! to enumerate a subtree to learn its size.

use std::collections::BTreeMap;

use strata_crypto::ContentHasher;
use strata_types::path::DIRECTORY_SEPARATOR;
use strata_types::{Address, Entry, EntryType};

use crate::error::{StoreError, StoreResult};

#[derive(Clone, Debug)]
enum Node {
    Directory(BTreeMap<String, Node>),
    Object(String),
}

/// Accumulates objects and builds the content-addressed tree for a commit.
#[derive(Clone, Debug, Default)]
pub struct TreeBuilder {
    root: BTreeMap<String, Node>,
}

/// The nodes of one committed tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommittedTree {
    /// Address of the root node (the commit pointer).
    pub root: Address,
    /// Objects in the whole tree.
    pub object_count: u64,
    /// Every `(parent address, child entry)` pair of the tree.
    pub nodes: Vec<(Address, Entry)>,
}

impl TreeBuilder {
    /// Start an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from `(path, checksum)` pairs.
    pub fn from_objects<I, P, C>(objects: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let mut builder = Self::new();
        for (path, checksum) in objects {
            builder.insert_object(path.as_ref(), checksum)?;
        }
        Ok(builder)
    }

    /// Add (or replace) the object at `path`.
    pub fn insert_object(&mut self, path: &str, checksum: impl Into<String>) -> StoreResult<()> {
        let invalid = |reason: &str| StoreError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };
        if path.is_empty() || path.ends_with(DIRECTORY_SEPARATOR) {
            return Err(invalid("object paths must be non-empty and not end with '/'"));
        }

        let segments: Vec<&str> = path.split(DIRECTORY_SEPARATOR).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("empty path segment"));
        }
        let (leaf, dirs) = segments
            .split_last()
            .ok_or_else(|| invalid("empty path"))?;

        let mut current = &mut self.root;
        for dir in dirs {
            let name = format!("{dir}{DIRECTORY_SEPARATOR}");
            let node = current
                .entry(name)
                .or_insert_with(|| Node::Directory(BTreeMap::new()));
            current = match node {
                Node::Directory(children) => children,
                Node::Object(_) => return Err(invalid("directory name is used by an object")),
            };
        }
        current.insert((*leaf).to_string(), Node::Object(checksum.into()));
        Ok(())
    }

    /// Compute addresses and object counts for every node.
    pub fn build(&self) -> CommittedTree {
        let mut nodes = Vec::new();
        let (root, object_count) = build_directory(&self.root, &mut nodes);
        CommittedTree {
            root,
            object_count,
            nodes,
        }
    }
}

/// Address of the tree with no entries.
pub fn empty_tree_address() -> Address {
    ContentHasher::TREE.hash(b"")
}

fn build_directory(children: &BTreeMap<String, Node>, out: &mut Vec<(Address, Entry)>) -> (Address, u64) {
    let mut entries = Vec::with_capacity(children.len());
    for (name, node) in children {
        let entry = match node {
            Node::Object(checksum) => Entry::object(
                ContentHasher::OBJECT.hash(checksum.as_bytes()),
                name.clone(),
                checksum.clone(),
            ),
            Node::Directory(grandchildren) => {
                let (address, count) = build_directory(grandchildren, out);
                Entry::tree(address, name.clone(), count)
            }
        };
        entries.push(entry);
    }

    let mut encoded = Vec::new();
    for entry in &entries {
        let kind = match entry.entry_type {
            EntryType::Tree => b't',
            EntryType::Object => b'o',
        };
        encoded.extend_from_slice(entry.name.as_bytes());
        encoded.push(0);
        encoded.push(kind);
        encoded.push(0);
        encoded.extend_from_slice(entry.address.as_bytes());
        encoded.push(b'\n');
    }
    let address = ContentHasher::TREE.hash(&encoded);
    let count = entries.iter().map(|e| e.object_count).sum();

    out.extend(entries.into_iter().map(|e| (address, e)));
    (address, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child<'a>(tree: &'a CommittedTree, parent: &Address, name: &str) -> Option<&'a Entry> {
        tree.nodes
            .iter()
            .find(|(p, e)| p == parent && e.name == name)
            .map(|(_, e)| e)
    }

    #[test]
    fn empty_builder_yields_empty_tree() {
        let tree = TreeBuilder::new().build();
        assert_eq!(tree.root, empty_tree_address());
        assert_eq!(tree.object_count, 0);
        assert!(tree.nodes.is_empty());
    }

    #[test]
    fn object_counts_are_transitive() {
        let tree = TreeBuilder::from_objects([
            ("a/x.csv", "1"),
            ("a/y.csv", "2"),
            ("a/b/z.csv", "3"),
            ("top.csv", "4"),
        ])
        .unwrap()
        .build();

        assert_eq!(tree.object_count, 4);
        let a = child(&tree, &tree.root, "a/").expect("a/ exists");
        assert_eq!(a.object_count, 3);
        assert_eq!(a.entry_type, EntryType::Tree);
        let b = child(&tree, &a.address, "b/").expect("b/ exists");
        assert_eq!(b.object_count, 1);
        let z = child(&tree, &b.address, "z.csv").expect("z.csv exists");
        assert_eq!(z.checksum.as_deref(), Some("3"));
        assert_eq!(z.object_count, 1);
    }

    #[test]
    fn unchanged_subtrees_share_addresses() {
        let before = TreeBuilder::from_objects([("a/x.csv", "1"), ("b/y.csv", "2")])
            .unwrap()
            .build();
        let after = TreeBuilder::from_objects([("a/x.csv", "1"), ("b/y.csv", "changed")])
            .unwrap()
            .build();

        assert_ne!(before.root, after.root);
        let a_before = child(&before, &before.root, "a/").unwrap();
        let a_after = child(&after, &after.root, "a/").unwrap();
        assert_eq!(a_before.address, a_after.address);
        let b_before = child(&before, &before.root, "b/").unwrap();
        let b_after = child(&after, &after.root, "b/").unwrap();
        assert_ne!(b_before.address, b_after.address);
    }

    #[test]
    fn rejects_malformed_paths() {
        let mut builder = TreeBuilder::new();
        assert!(builder.insert_object("", "1").is_err());
        assert!(builder.insert_object("dir/", "1").is_err());
        assert!(builder.insert_object("a//b", "1").is_err());
    }

    #[test]
    fn replacing_an_object_keeps_one_leaf() {
        let mut builder = TreeBuilder::new();
        builder.insert_object("a/x.csv", "1").unwrap();
        builder.insert_object("a/x.csv", "2").unwrap();
        let tree = builder.build();
        assert_eq!(tree.object_count, 1);
    }
}
