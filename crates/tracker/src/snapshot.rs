//! JSON snapshot tracker.
//!
//! Serves a [`ProjectSnapshot`] held in memory. Snapshots can be loaded from
//! and saved to a JSON file, so a live fetch can be replayed offline.

use std::path::Path;
use async_trait::async_trait;
use sprintstat_core::{Issue, IssueIid, Note, ProjectId, ProjectMember, ProjectSnapshot};
use tokio::fs;
use tracing::debug;
use super::{Result, Tracker, TrackerError};

/// Tracker backed by a single project snapshot.
pub struct SnapshotTracker {
    snapshot: ProjectSnapshot,
}

impl SnapshotTracker {
    /// Serve the given snapshot.
    pub fn new(snapshot: ProjectSnapshot) -> Self {
        Self { snapshot }
    }

    /// Read a snapshot from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let snapshot: ProjectSnapshot = serde_json::from_str(&content)?;
        debug!(
            "Loaded snapshot of project {} from {} ({} issues)",
            snapshot.project,
            path.display(),
            snapshot.issues.len()
        );
        Ok(Self::new(snapshot))
    }

    /// Write a snapshot to a JSON file, creating parent directories.
    pub async fn save(snapshot: &ProjectSnapshot, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(path, json.as_bytes()).await?;
        Ok(())
    }

    /// The served snapshot.
    pub fn snapshot(&self) -> &ProjectSnapshot {
        &self.snapshot
    }

    fn check_project(&self, project: ProjectId) -> Result<()> {
        if project == self.snapshot.project {
            Ok(())
        } else {
            Err(TrackerError::NotFound(format!("project {}", project)))
        }
    }
}

#[async_trait]
impl Tracker for SnapshotTracker {
    async fn list_members(&self, project: ProjectId) -> Result<Vec<ProjectMember>> {
        self.check_project(project)?;
        Ok(self.snapshot.members.clone())
    }

    async fn list_issues(&self, project: ProjectId) -> Result<Vec<Issue>> {
        self.check_project(project)?;
        Ok(self.snapshot.issues.iter().map(|r| r.issue.clone()).collect())
    }

    async fn list_notes(&self, project: ProjectId, issue: IssueIid) -> Result<Vec<Note>> {
        self.check_project(project)?;
        self.snapshot
            .issues
            .iter()
            .find(|r| r.issue.iid == issue)
            .map(|r| r.notes.clone())
            .ok_or_else(|| TrackerError::NotFound(format!("issue {}", issue)))
    }
}
