//! Sprintstat core data models.
//!
//! This crate defines the tracker-neutral data structures the sprint
//! accounting runs on, and the sprint calendar that decides which sprint
//! an instant belongs to.

#![warn(missing_docs)]

// Identities
mod id;

// Tracker entities
mod member;
mod issue;
mod snapshot;

// Sprint windowing
mod sprint;

// Re-exports
pub use id::*;

pub use member::{AccessLevel, ProjectMember};
pub use issue::{Issue, IssueState, Note};
pub use snapshot::{IssueRecord, ProjectSnapshot};
pub use sprint::{SprintCalendar, SprintError, SprintIndex, DEFAULT_SPRINT_DAYS};

/// Calendar date type used for tracker timestamps
pub type Date = chrono::NaiveDate;

/// Instant type used for sprint boundaries
pub type Instant = chrono::NaiveDateTime;
