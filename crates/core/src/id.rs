//! Identifiers for tracker entities.

use serde::{Deserialize, Serialize};

/// Identifier of a project on the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(u64);

impl ProjectId {
    /// Wrap a raw project id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw numeric id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ProjectId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Project-scoped issue number (the `#12` users see).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueIid(u64);

impl IssueIid {
    /// Wrap a raw issue number.
    pub fn new(iid: u64) -> Self {
        Self(iid)
    }

    /// The raw issue number.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for IssueIid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a note, unique within the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(u64);

impl NoteId {
    /// Wrap a raw note id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
