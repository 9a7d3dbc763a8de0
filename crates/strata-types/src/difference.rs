//! Difference records produced by the diff engine.

use serde::{Deserialize, Serialize};

use crate::entry::EntryType;

/// Kind of change at a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceType {
    Added,
    Changed,
    Removed,
}

/// Which side of a two-ref comparison a difference originates from.
///
/// Workspace diffs only produce [`DifferenceDirection::Left`] (the workspace
/// side); the other variants keep the record shape usable for comparing two
/// refs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceDirection {
    Left,
    Right,
    Conflict,
}

/// A single change at a path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    #[serde(rename = "type")]
    pub diff_type: DifferenceType,
    pub direction: DifferenceDirection,
    pub path: String,
    pub path_type: EntryType,
}

impl Difference {
    /// A workspace-side difference.
    pub fn left(diff_type: DifferenceType, path: impl Into<String>, path_type: EntryType) -> Self {
        Self {
            diff_type,
            direction: DifferenceDirection::Left,
            path: path.into(),
            path_type,
        }
    }
}

/// Ordered sequence of differences, in traversal order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Differences(Vec<Difference>);

impl Differences {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a difference.
    pub fn push(&mut self, difference: Difference) {
        self.0.push(difference);
    }

    /// Returns `true` if there are no differences.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of differences.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate in traversal order.
    pub fn iter(&self) -> std::slice::Iter<'_, Difference> {
        self.0.iter()
    }

    /// The differences as a slice.
    pub fn as_slice(&self) -> &[Difference] {
        &self.0
    }

    /// Consume into the underlying vector.
    pub fn into_vec(self) -> Vec<Difference> {
        self.0
    }
}

impl From<Vec<Difference>> for Differences {
    fn from(v: Vec<Difference>) -> Self {
        Self(v)
    }
}

impl IntoIterator for Differences {
    type Item = Difference;
    type IntoIter = std::vec::IntoIter<Difference>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Differences {
    type Item = &'a Difference;
    type IntoIter = std::slice::Iter<'a, Difference>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
