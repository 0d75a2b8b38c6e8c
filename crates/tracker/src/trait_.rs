//! Tracker trait abstraction.

use async_trait::async_trait;
use sprintstat_core::{Issue, IssueIid, IssueRecord, Note, ProjectId, ProjectMember, ProjectSnapshot};
use tracing::{debug, info};

/// Error type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors that can occur while talking to a tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The tracker answered with a non-success status
    #[error("{url} returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
        /// Response body, for diagnostics
        body: String,
    },

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Read-only query interface to an issue tracker.
///
/// Implementations return complete listings; pagination is their concern.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// List all members of a project, including inherited ones.
    async fn list_members(&self, project: ProjectId) -> Result<Vec<ProjectMember>>;

    /// List all issues of a project, open and closed.
    async fn list_issues(&self, project: ProjectId) -> Result<Vec<Issue>>;

    /// List all notes on one issue.
    async fn list_notes(&self, project: ProjectId, issue: IssueIid) -> Result<Vec<Note>>;
}

/// Fetch members, issues and every issue's notes in sequence.
///
/// Any failure aborts the whole fetch; there is no partial snapshot.
pub async fn fetch_snapshot<T>(tracker: &T, project: ProjectId) -> Result<ProjectSnapshot>
where
    T: Tracker + ?Sized,
{
    let members = tracker.list_members(project).await?;
    info!("Fetched {} members of project {}", members.len(), project);

    let issues = tracker.list_issues(project).await?;
    info!("Fetched {} issues of project {}", issues.len(), project);

    let mut records = Vec::with_capacity(issues.len());
    for issue in issues {
        let notes = tracker.list_notes(project, issue.iid).await?;
        debug!("Issue {} has {} notes", issue.iid, notes.len());
        records.push(IssueRecord::new(issue, notes));
    }

    Ok(ProjectSnapshot {
        project,
        members,
        issues: records,
    })
}
