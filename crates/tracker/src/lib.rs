//! Issue tracker access for sprintstat.
//!
//! This crate provides the trait the accounting pulls its data through,
//! a GitLab REST implementation, and a JSON snapshot implementation for
//! offline runs and tests.

#![warn(missing_docs)]

pub mod trait_;
pub mod gitlab;
pub mod snapshot;

pub use trait_::{fetch_snapshot, Tracker, TrackerError, Result};
pub use gitlab::{GitLabConfig, GitLabTracker, DEFAULT_GITLAB_HOST};
pub use snapshot::SnapshotTracker;
