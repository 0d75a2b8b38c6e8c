//! GitLab REST backend.
//!
//! Talks to the v4 API with a personal access token. Every listing is
//! paginated with `per_page` and followed through the `x-next-page` header
//! until GitLab reports no further page.

use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sprintstat_core::{
    AccessLevel, Issue, IssueIid, IssueState, Note, NoteId, ProjectId, ProjectMember,
};
use tracing::debug;
use super::{Result, Tracker, TrackerError};

/// GitLab instance used when none is configured.
pub const DEFAULT_GITLAB_HOST: &str = "https://gitlab.ewi.tudelft.nl";

/// GitLab client configuration.
#[derive(Debug, Clone)]
pub struct GitLabConfig {
    /// Base URL of the instance, without `/api/v4`
    pub host: String,

    /// Personal access token with `api` scope
    pub private_token: String,

    /// Page size for listings (GitLab caps this at 100)
    pub per_page: u32,

    /// Request timeout
    pub timeout: Duration,
}

impl GitLabConfig {
    /// Config for the default host with the given token.
    pub fn new(private_token: impl Into<String>) -> Self {
        Self {
            private_token: private_token.into(),
            ..Default::default()
        }
    }

    /// Use another GitLab instance.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GITLAB_HOST.to_string(),
            private_token: String::new(),
            per_page: 100,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Tracker backed by the GitLab REST API.
#[derive(Clone)]
pub struct GitLabTracker {
    /// HTTP client
    client: Client,

    /// Configuration
    config: GitLabConfig,
}

impl GitLabTracker {
    /// Create a client for the configured instance.
    pub fn new(config: GitLabConfig) -> Result<Self> {
        if config.private_token.trim().is_empty() {
            return Err(TrackerError::InvalidConfig("private token is empty".to_string()));
        }
        if config.per_page == 0 || config.per_page > 100 {
            return Err(TrackerError::InvalidConfig(format!(
                "per_page must be between 1 and 100, got {}",
                config.per_page
            )));
        }

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(concat!("sprintstat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v4/{}", self.config.host.trim_end_matches('/'), path)
    }

    /// GET every page of a listing.
    async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = self.api_url(path);
        let per_page = self.config.per_page.to_string();
        let mut page: u32 = 1;
        let mut items = Vec::new();

        loop {
            let page_param = page.to_string();
            let response = self
                .client
                .get(&url)
                .header("PRIVATE-TOKEN", &self.config.private_token)
                .query(&[("per_page", per_page.as_str()), ("page", page_param.as_str())])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(TrackerError::Status {
                    status,
                    url: url.clone(),
                    body,
                });
            }

            let next = next_page(response.headers().get("x-next-page"));
            let mut batch: Vec<T> = response.json().await?;
            debug!("GET {} page {}: {} items", url, page, batch.len());
            items.append(&mut batch);

            match next {
                Some(n) if n > page => page = n,
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl Tracker for GitLabTracker {
    async fn list_members(&self, project: ProjectId) -> Result<Vec<ProjectMember>> {
        let wire: Vec<WireMember> = self
            .get_all(&format!("projects/{}/members/all", project))
            .await?;
        Ok(wire.into_iter().map(ProjectMember::from).collect())
    }

    async fn list_issues(&self, project: ProjectId) -> Result<Vec<Issue>> {
        let wire: Vec<WireIssue> = self
            .get_all(&format!("projects/{}/issues", project))
            .await?;
        Ok(wire.into_iter().map(Issue::from).collect())
    }

    async fn list_notes(&self, project: ProjectId, issue: IssueIid) -> Result<Vec<Note>> {
        let wire: Vec<WireNote> = self
            .get_all(&format!("projects/{}/issues/{}/notes", project, issue.get()))
            .await?;
        Ok(wire.into_iter().map(Note::from).collect())
    }
}

/// Parse the `x-next-page` header; GitLab sends it empty on the last page.
fn next_page(header: Option<&reqwest::header::HeaderValue>) -> Option<u32> {
    header
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[derive(Debug, Deserialize)]
struct WireUser {
    username: String,
}

#[derive(Debug, Deserialize)]
struct WireMember {
    username: String,
    access_level: u32,
}

impl From<WireMember> for ProjectMember {
    fn from(m: WireMember) -> Self {
        ProjectMember::new(m.username, AccessLevel::new(m.access_level))
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireTimeStats {
    #[serde(default)]
    time_estimate: u64,
}

#[derive(Debug, Deserialize)]
struct WireIssue {
    iid: u64,
    #[serde(default)]
    title: String,
    created_at: DateTime<FixedOffset>,
    #[serde(default)]
    closed_at: Option<DateTime<FixedOffset>>,
    state: IssueState,
    #[serde(default)]
    assignees: Vec<WireUser>,
    #[serde(default)]
    time_stats: WireTimeStats,
}

// Timestamps are cut to the calendar day in the offset GitLab reported.
impl From<WireIssue> for Issue {
    fn from(w: WireIssue) -> Self {
        Issue {
            iid: IssueIid::new(w.iid),
            title: w.title,
            created_at: w.created_at.date_naive(),
            closed_at: w.closed_at.map(|t| t.date_naive()),
            state: w.state,
            assignees: w.assignees.into_iter().map(|u| u.username).collect(),
            time_estimate: w.time_stats.time_estimate,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireNote {
    id: u64,
    created_at: DateTime<FixedOffset>,
    author: WireUser,
    #[serde(default)]
    body: String,
    #[serde(default)]
    system: bool,
}

impl From<WireNote> for Note {
    fn from(w: WireNote) -> Self {
        Note {
            id: NoteId::new(w.id),
            created_at: w.created_at.date_naive(),
            author: w.author.username,
            body: w.body,
            system: w.system,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use reqwest::header::HeaderValue;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve canned HTTP responses on a local port, one per connection.
    /// Returns the base URL and the raw requests received.
    async fn spawn_server<F>(respond: F) -> (String, Arc<Mutex<Vec<String>>>)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let request = String::from_utf8_lossy(&buf).to_string();
                let response = respond(&request);
                log.lock().unwrap().push(request);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), requests)
    }

    fn http_response(status: &str, next_page: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nx-next-page: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            next_page,
            body
        )
    }

    // Bypass any proxy configured in the environment
    fn tracker_for(host: &str) -> GitLabTracker {
        GitLabTracker {
            client: ClientBuilder::new().no_proxy().build().unwrap(),
            config: GitLabConfig::new("secret").with_host(host),
        }
    }

    fn request_line(request: &str) -> &str {
        request.lines().next().unwrap_or_default()
    }

    fn day(s: &str) -> sprintstat_core::Date {
        s.parse().unwrap()
    }

    #[test]
    fn test_issue_from_wire() {
        let json = r#"{
            "id": 9001,
            "iid": 12,
            "title": "Sprint board",
            "state": "closed",
            "created_at": "2019-05-01T09:12:44.123Z",
            "closed_at": "2019-05-15T23:30:00.000+02:00",
            "assignees": [{"id": 1, "username": "alice"}, {"id": 2, "username": "bob"}],
            "time_stats": {"time_estimate": 36000, "total_time_spent": 7200}
        }"#;
        let wire: WireIssue = serde_json::from_str(json).unwrap();
        let issue = Issue::from(wire);

        assert_eq!(issue.iid, IssueIid::new(12));
        assert_eq!(issue.state, IssueState::Closed);
        assert_eq!(issue.created_at, day("2019-05-01"));
        // Local day of the reported offset, not UTC
        assert_eq!(issue.closed_at, Some(day("2019-05-15")));
        assert_eq!(issue.assignees, vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(issue.time_estimate, 36000);
    }

    #[test]
    fn test_issue_from_wire_without_optional_fields() {
        let json = r#"{
            "iid": 3,
            "state": "opened",
            "created_at": "2019-06-01T10:00:00Z",
            "closed_at": null
        }"#;
        let issue = Issue::from(serde_json::from_str::<WireIssue>(json).unwrap());
        assert!(issue.assignees.is_empty());
        assert_eq!(issue.time_estimate, 0);
        assert_eq!(issue.closed_at, None);
    }

    #[test]
    fn test_note_from_wire() {
        let json = r#"{
            "id": 77,
            "body": "added 1h 30m of time spent at 2019-05-20",
            "author": {"id": 1, "username": "alice", "name": "Alice"},
            "created_at": "2019-05-20T14:00:00.000Z",
            "system": true
        }"#;
        let note = Note::from(serde_json::from_str::<WireNote>(json).unwrap());
        assert_eq!(note.id, NoteId::new(77));
        assert_eq!(note.author, "alice");
        assert_eq!(note.created_at, day("2019-05-20"));
        assert!(note.system);
    }

    #[test]
    fn test_member_from_wire() {
        let json = r#"[{"id": 1, "username": "alice", "access_level": 30},
                       {"id": 2, "username": "carol", "access_level": 40}]"#;
        let members: Vec<ProjectMember> = serde_json::from_str::<Vec<WireMember>>(json)
            .unwrap()
            .into_iter()
            .map(ProjectMember::from)
            .collect();
        assert_eq!(members[0].access_level, AccessLevel::DEVELOPER);
        assert_eq!(members[1].access_level, AccessLevel::MAINTAINER);
    }

    #[test]
    fn test_next_page_header() {
        assert_eq!(next_page(Some(&HeaderValue::from_static("3"))), Some(3));
        assert_eq!(next_page(Some(&HeaderValue::from_static(""))), None);
        assert_eq!(next_page(None), None);
    }

    #[tokio::test]
    async fn test_listing_follows_next_page() {
        let (host, requests) = spawn_server(|request| {
            if request_line(request).contains("page=2") {
                http_response("200 OK", "", r#"[{"username": "carol", "access_level": 30}]"#)
            } else {
                http_response(
                    "200 OK",
                    "2",
                    r#"[{"username": "alice", "access_level": 30}, {"username": "bob", "access_level": 20}]"#,
                )
            }
        })
        .await;

        let members = tracker_for(&host).list_members(ProjectId::new(5)).await.unwrap();

        let names: Vec<_> = members.iter().map(|m| m.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(request_line(&requests[0]).starts_with("GET /api/v4/projects/5/members/all?"));
        assert!(request_line(&requests[0]).contains("per_page=100"));
        assert!(request_line(&requests[0]).contains("page=1"));
        assert!(request_line(&requests[1]).contains("page=2"));
        assert!(requests[0].to_lowercase().contains("private-token: secret"));
    }

    #[tokio::test]
    async fn test_listing_stops_when_next_page_does_not_advance() {
        let (host, requests) = spawn_server(|_| {
            http_response("200 OK", "1", r#"[{"username": "alice", "access_level": 30}]"#)
        })
        .await;

        let members = tracker_for(&host).list_members(ProjectId::new(5)).await.unwrap();

        assert_eq!(members.len(), 1);
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_notes_listing_decodes_pages() {
        let (host, _) = spawn_server(|_| {
            http_response(
                "200 OK",
                "",
                r#"[{"id": 1, "body": "added 1h of time spent at 2019-05-20",
                     "author": {"username": "alice"}, "created_at": "2019-05-20T10:00:00Z", "system": true}]"#,
            )
        })
        .await;

        let notes = tracker_for(&host)
            .list_notes(ProjectId::new(5), IssueIid::new(3))
            .await
            .unwrap();

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].author, "alice");
        assert_eq!(notes[0].created_at, day("2019-05-20"));
    }

    #[tokio::test]
    async fn test_error_status_aborts_listing() {
        let (host, _) = spawn_server(|_| {
            http_response("401 Unauthorized", "", r#"{"message": "401 Unauthorized"}"#)
        })
        .await;

        let err = tracker_for(&host).list_issues(ProjectId::new(5)).await.unwrap_err();

        match err {
            TrackerError::Status { status, url, body } => {
                assert_eq!(status, 401);
                assert!(url.ends_with("/api/v4/projects/5/issues"));
                assert!(body.contains("401 Unauthorized"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            GitLabTracker::new(GitLabConfig::default()),
            Err(TrackerError::InvalidConfig(_))
        ));

        let mut config = GitLabConfig::new("token");
        config.per_page = 500;
        assert!(matches!(
            GitLabTracker::new(config),
            Err(TrackerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_api_url_strips_trailing_slash() {
        let tracker =
            GitLabTracker::new(GitLabConfig::new("token").with_host("https://gitlab.example.com/"))
                .unwrap();
        assert_eq!(
            tracker.api_url("projects/1/issues"),
            "https://gitlab.example.com/api/v4/projects/1/issues"
        );
    }
}
