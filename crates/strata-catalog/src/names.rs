//! Validation of inbound identifiers.
//!
//! Every catalog operation checks its arguments here before touching
//! storage:
//! - Repository names: 3 to 63 characters, lowercase ASCII letters, digits
//!   and `-`, starting with a letter or digit
//! - Branch names: 1 to 256 characters, ASCII letters, digits, `_` and `-`,
//!   not starting with `-`
//! - Paths: non-empty, at most 1024 bytes, no NUL bytes

use crate::error::ValidationError;

const REPOSITORY_NAME_MIN: usize = 3;
const REPOSITORY_NAME_MAX: usize = 63;
const BRANCH_NAME_MAX: usize = 256;
const PATH_MAX_BYTES: usize = 1024;

/// Validate a repository name.
///
/// ```
/// use strata_catalog::names::validate_repository_name;
///
/// assert!(validate_repository_name("lake-01").is_ok());
/// assert!(validate_repository_name("Lake").is_err());
/// assert!(validate_repository_name("-lake").is_err());
/// ```
pub fn validate_repository_name(name: &str) -> Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::new("repository", name, reason);

    let len = name.chars().count();
    if !(REPOSITORY_NAME_MIN..=REPOSITORY_NAME_MAX).contains(&len) {
        return Err(invalid(format!(
            "must be {REPOSITORY_NAME_MIN} to {REPOSITORY_NAME_MAX} characters"
        )));
    }

    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }

    if name.starts_with('-') {
        return Err(invalid("must start with a letter or digit".into()));
    }

    Ok(())
}

/// Validate a branch name.
///
/// ```
/// use strata_catalog::names::validate_branch_name;
///
/// assert!(validate_branch_name("main").is_ok());
/// assert!(validate_branch_name("_scratch-2").is_ok());
/// assert!(validate_branch_name("").is_err());
/// assert!(validate_branch_name("feature/x").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::new("branch", name, reason);

    let Some(first) = name.chars().next() else {
        return Err(invalid("must not be empty".into()));
    };

    if name.chars().count() > BRANCH_NAME_MAX {
        return Err(invalid(format!("must be at most {BRANCH_NAME_MAX} characters")));
    }

    if !(first.is_ascii_alphanumeric() || first == '_') {
        return Err(invalid(
            "must start with a letter, digit, or underscore".into(),
        ));
    }

    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }

    Ok(())
}

/// Validate an entry path.
pub fn validate_path(path: &str) -> Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::new("path", path, reason);

    if path.is_empty() {
        return Err(invalid("must not be empty".into()));
    }
    if path.len() > PATH_MAX_BYTES {
        return Err(invalid(format!("must be at most {PATH_MAX_BYTES} bytes")));
    }
    if path.contains('\0') {
        return Err(invalid("must not contain NUL".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_repository_names() {
        for name in ["abc", "lake", "lake-01", "0data", "a".repeat(63).as_str()] {
            assert!(validate_repository_name(name).is_ok(), "expected valid: {name}");
        }
    }

    #[test]
    fn invalid_repository_names() {
        for name in ["", "ab", "Lake", "-lake", "la_ke", "la ke", "a".repeat(64).as_str()] {
            let err = validate_repository_name(name).unwrap_err();
            assert_eq!(err.field, "repository");
            assert_eq!(err.value, name);
        }
    }

    #[test]
    fn valid_branch_names() {
        for name in ["main", "m", "_tmp", "feature-42", "Release_1", "b".repeat(256).as_str()] {
            assert!(validate_branch_name(name).is_ok(), "expected valid: {name}");
        }
    }

    #[test]
    fn invalid_branch_names() {
        for name in ["", "-dash", "feature/x", "a.b", "tab\there", "b".repeat(257).as_str()] {
            let err = validate_branch_name(name).unwrap_err();
            assert_eq!(err.field, "branch");
        }
    }

    #[test]
    fn path_rules() {
        assert!(validate_path("data/a.csv").is_ok());
        assert!(validate_path("dir/").is_ok());
        assert!(validate_path(&"p".repeat(1024)).is_ok());

        assert_eq!(validate_path("").unwrap_err().field, "path");
        assert!(validate_path(&"p".repeat(1025)).is_err());
        assert!(validate_path("bad\0path").is_err());
    }
}
