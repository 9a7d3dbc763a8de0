//! Workspace-vs-commit diff.
//!
//! Walks the staged entries of a branch directory by directory, joining each
//! staged child with the committed child of the same name:
//!
//! - no committed counterpart: the path was added;
//! - staged tombstones equal to the committed object count: the whole entry
//!   was removed, and nothing below it is visited;
//! - a staged object with a different checksum: the object changed;
//! - a staged directory otherwise: descend into it.
//!
//! Only staged paths are visited, so directories without staged children
//! contribute nothing no matter how large they are in the tree.

use strata_store::{ListOptions, TreeReader, WorkspaceReader};
use strata_types::{
    Address, Difference, DifferenceType, Differences, Entry, EntryType, WorkspaceEntry,
};
use tracing::debug;

use crate::error::{DiffError, DiffResult};

/// Options controlling how the workspace is read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Page size for workspace directory listings. `None` lists each
    /// directory in a single call; `Some(0)` is read as pages of one.
    pub page_size: Option<usize>,
}

enum Step {
    /// List the staged children of `path`, whose committed node is `address`.
    Directory { path: String, address: Address },
    /// Compare one staged child against the committed children of `parent`.
    Child { entry: WorkspaceEntry, parent: Address },
}

/// Diff the workspace of `branch` against its last commit.
///
/// All reads go through `reader`, which must present a single consistent
/// snapshot (a repository transaction). Differences are returned in
/// traversal order: depth-first, children in workspace listing order. Any
/// store failure other than a missing tree entry aborts the diff.
pub async fn diff_workspace<R>(reader: &R, branch: &str, options: &DiffOptions) -> DiffResult<Differences>
where
    R: TreeReader + WorkspaceReader + ?Sized,
{
    let head = reader.read_branch(branch).await.map_err(|e| {
        if e.is_not_found() {
            DiffError::BranchNotFound(branch.to_string())
        } else {
            DiffError::Store(e)
        }
    })?;

    let mut differences = Differences::new();
    let mut pending = vec![Step::Directory {
        path: String::new(),
        address: head.commit_root,
    }];
    let mut directories = 0usize;

    while let Some(step) = pending.pop() {
        match step {
            Step::Directory { path, address } => {
                directories += 1;
                let children = list_staged_children(reader, branch, &path, options).await?;
                // Reversed so the first listed child is compared first.
                pending.extend(
                    children
                        .into_iter()
                        .rev()
                        .map(|entry| Step::Child { entry, parent: address }),
                );
            }
            Step::Child { entry, parent } => {
                let committed = match reader.read_tree_entry(&parent, &entry.entry_name).await {
                    Ok(found) => Some(found),
                    Err(e) if e.is_not_found() => None,
                    Err(e) => return Err(e.into()),
                };
                if let Some(next) = compare(entry, committed, &mut differences) {
                    pending.push(next);
                }
            }
        }
    }

    debug!(
        branch,
        commit_root = %head.commit_root.short_hex(),
        directories,
        differences = differences.len(),
        "workspace diff complete"
    );
    Ok(differences)
}

/// Compare one staged entry with its committed counterpart, recording any
/// difference. Returns the directory to descend into, if any.
fn compare(staged: WorkspaceEntry, committed: Option<Entry>, out: &mut Differences) -> Option<Step> {
    let Some(committed) = committed else {
        out.push(Difference::left(
            DifferenceType::Added,
            staged.path,
            staged.entry_type,
        ));
        return None;
    };

    if staged.is_tombstoned() && staged.tombstone_count == committed.object_count {
        out.push(Difference::left(
            DifferenceType::Removed,
            staged.path,
            staged.entry_type,
        ));
        return None;
    }

    match staged.entry_type {
        EntryType::Object => {
            let rewritten = !staged.is_tombstoned()
                && staged.entry_checksum.is_some()
                && staged.entry_checksum != committed.checksum;
            if rewritten {
                out.push(Difference::left(
                    DifferenceType::Changed,
                    staged.path,
                    EntryType::Object,
                ));
            }
            None
        }
        EntryType::Tree => Some(Step::Directory {
            path: staged.path,
            address: committed.address,
        }),
    }
}

async fn list_staged_children<R>(
    reader: &R,
    branch: &str,
    path: &str,
    options: &DiffOptions,
) -> DiffResult<Vec<WorkspaceEntry>>
where
    R: WorkspaceReader + ?Sized,
{
    let Some(page_size) = options.page_size else {
        let page = reader
            .list_workspace_directory(branch, path, &ListOptions::full_scan())
            .await?;
        return Ok(page.entries);
    };

    let mut entries = Vec::new();
    let mut token = None;
    loop {
        let listing = ListOptions::paged(page_size.max(1)).with_page_token(token);
        let page = reader
            .list_workspace_directory(branch, path, &listing)
            .await?;
        entries.extend(page.entries);
        match page.next_page_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    Ok(entries)
}
