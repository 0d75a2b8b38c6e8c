//! Issues and their notes.

use serde::{Deserialize, Serialize};
use crate::id::{IssueIid, NoteId};
use crate::Date;

/// Lifecycle state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    /// Open
    Opened,
    /// Closed
    Closed,
    /// Locked for discussion
    Locked,
}

/// An issue with the time tracking fields the accounting needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Project-scoped number
    pub iid: IssueIid,

    /// Title, for log messages only
    #[serde(default)]
    pub title: String,

    /// Day the issue was opened
    pub created_at: Date,

    /// Day the issue was closed, if it was
    #[serde(default)]
    pub closed_at: Option<Date>,

    /// Current state
    pub state: IssueState,

    /// Usernames of the current assignees
    #[serde(default)]
    pub assignees: Vec<String>,

    /// Estimated effort in seconds
    #[serde(default)]
    pub time_estimate: u64,
}

impl Issue {
    /// Create an open, unassigned issue without estimate.
    pub fn new(iid: IssueIid, created_at: Date) -> Self {
        Self {
            iid,
            title: String::new(),
            created_at,
            closed_at: None,
            state: IssueState::Opened,
            assignees: Vec::new(),
            time_estimate: 0,
        }
    }

    /// Set the estimate in seconds.
    pub fn with_estimate(mut self, seconds: u64) -> Self {
        self.time_estimate = seconds;
        self
    }

    /// Add an assignee.
    pub fn assigned_to(mut self, username: impl Into<String>) -> Self {
        self.assignees.push(username.into());
        self
    }

    /// Mark the issue closed on the given day.
    pub fn closed_on(mut self, date: Date) -> Self {
        self.state = IssueState::Closed;
        self.closed_at = Some(date);
        self
    }

    /// The close date, only when the issue is currently closed.
    pub fn close_date(&self) -> Option<Date> {
        match self.state {
            IssueState::Closed => self.closed_at,
            _ => None,
        }
    }
}

/// A comment or system note attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Tracker-wide id
    pub id: NoteId,

    /// Day the note was written
    pub created_at: Date,

    /// Username of the author
    pub author: String,

    /// Free-text body
    pub body: String,

    /// Whether the tracker generated the note (time tracking notes are)
    #[serde(default)]
    pub system: bool,
}

impl Note {
    /// Create a note.
    pub fn new(id: NoteId, created_at: Date, author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            created_at,
            author: author.into(),
            body: body.into(),
            system: false,
        }
    }
}
