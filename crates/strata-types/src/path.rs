//! Path conventions shared by the tree and the workspace.
//!
//! Paths are relative to the branch root. Directory paths end with
//! [`DIRECTORY_SEPARATOR`] (`"a/b/"`), object paths do not (`"a/b/c.csv"`).
//! An entry's name is its last segment, keeping the trailing separator for
//! directories, so that ordering children by full path and ordering them by
//! name agree.

/// Separator between path segments.
pub const DIRECTORY_SEPARATOR: char = '/';

/// Returns `true` if `path` names a directory.
pub fn is_directory_path(path: &str) -> bool {
    path.ends_with(DIRECTORY_SEPARATOR)
}

fn without_trailing_separator(path: &str) -> &str {
    path.strip_suffix(DIRECTORY_SEPARATOR).unwrap_or(path)
}

/// The last segment of `path` (`"a/b/" -> "b/"`, `"a/x" -> "x"`).
pub fn entry_name(path: &str) -> &str {
    match without_trailing_separator(path).rfind(DIRECTORY_SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// The directory containing `path`, with its trailing separator.
///
/// Returns `""` (the branch root) for top-level entries.
pub fn parent_directory(path: &str) -> &str {
    match without_trailing_separator(path).rfind(DIRECTORY_SEPARATOR) {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

/// Returns `true` if `path` sits directly inside the directory `prefix`.
pub fn is_immediate_child(prefix: &str, path: &str) -> bool {
    !path.is_empty() && path != prefix && parent_directory(path) == prefix
}
