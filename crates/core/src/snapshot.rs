//! A complete, fetched view of one project.

use serde::{Deserialize, Serialize};
use crate::id::ProjectId;
use crate::issue::{Issue, Note};
use crate::member::ProjectMember;

/// An issue together with its notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// The issue
    #[serde(flatten)]
    pub issue: Issue,

    /// All notes on the issue
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl IssueRecord {
    /// Pair an issue with its notes.
    pub fn new(issue: Issue, notes: Vec<Note>) -> Self {
        Self { issue, notes }
    }
}

/// Members, issues and notes of one project, fetched before accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Project the data belongs to
    pub project: ProjectId,

    /// Project members, in the order the tracker listed them
    #[serde(default)]
    pub members: Vec<ProjectMember>,

    /// Issues with their notes
    #[serde(default)]
    pub issues: Vec<IssueRecord>,
}

impl ProjectSnapshot {
    /// An empty snapshot.
    pub fn new(project: ProjectId) -> Self {
        Self {
            project,
            members: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Total number of notes across all issues.
    pub fn note_count(&self) -> usize {
        self.issues.iter().map(|r| r.notes.len()).sum()
    }
}
