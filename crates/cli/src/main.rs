//! sprintstat - GitLab time spent/estimate statistics per sprint.

use std::path::PathBuf;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, ValueEnum};
use sprintstat_accounting::{AccountingConfig, EstimateSplit, SprintAccountant, UnknownMemberPolicy};
use sprintstat_core::{AccessLevel, ProjectId, ProjectSnapshot, SprintCalendar, SprintIndex, DEFAULT_SPRINT_DAYS};
use sprintstat_tracker::{fetch_snapshot, GitLabConfig, GitLabTracker, SnapshotTracker, DEFAULT_GITLAB_HOST};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sprintstat")]
#[command(about = "Show GitLab time spent/estimate statistics per sprint", long_about = None)]
struct Cli {
    /// Project id of the GitLab project, shown on the project's home page
    project_id: ProjectId,

    /// Sprint number; sprint 1 starts at the epoch
    sprint: SprintIndex,

    /// Personal access token with api scope
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitLab instance
    #[arg(long, env = "GITLAB_HOST", default_value = DEFAULT_GITLAB_HOST)]
    host: String,

    /// Give every assignee the whole issue estimate instead of an equal share
    #[arg(short = 'e', long)]
    full_estimate: bool,

    /// Read project data from a snapshot file instead of GitLab
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Write the fetched project data to a snapshot file
    #[arg(long, value_name = "FILE")]
    save_snapshot: Option<PathBuf>,

    /// Start of sprint 1 (default 2019-05-03T13:45:00)
    #[arg(long, value_parser = parse_epoch)]
    epoch: Option<NaiveDateTime>,

    /// Sprint length in days
    #[arg(long, default_value_t = DEFAULT_SPRINT_DAYS)]
    sprint_days: i64,

    /// Access level that puts a member on the roster (30 = developer)
    #[arg(long, default_value_t = AccessLevel::DEVELOPER.get())]
    access_level: u32,

    /// Fail when an assignee or note author is not on the roster
    #[arg(long)]
    strict: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Report goes to stdout; logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_epoch(s: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM[:SS], got '{}'", s))
}

impl Cli {
    fn accounting_config(&self) -> Result<AccountingConfig> {
        let epoch = self.epoch.unwrap_or(SprintCalendar::default().epoch);
        let calendar = SprintCalendar::new(epoch, self.sprint_days)?;

        Ok(AccountingConfig {
            calendar,
            sprint: self.sprint,
            split: if self.full_estimate {
                EstimateSplit::Full
            } else {
                EstimateSplit::Divide
            },
            roster_level: AccessLevel::new(self.access_level),
            unknown_members: if self.strict {
                UnknownMemberPolicy::Fail
            } else {
                UnknownMemberPolicy::Skip
            },
        })
    }

    async fn load_snapshot(&self) -> Result<ProjectSnapshot> {
        if let Some(path) = &self.snapshot {
            let tracker = SnapshotTracker::load(path)
                .await
                .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
            return Ok(fetch_snapshot(&tracker, self.project_id).await?);
        }

        let token = self
            .token
            .clone()
            .ok_or_else(|| anyhow!("A GitLab token is required (--token or GITLAB_TOKEN)"))?;
        let tracker = GitLabTracker::new(GitLabConfig::new(token).with_host(self.host.as_str()))?;
        info!("Fetching project {} from {}", self.project_id, self.host);
        fetch_snapshot(&tracker, self.project_id)
            .await
            .context("Failed to fetch project data from GitLab")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.accounting_config()?;
    let snapshot = cli.load_snapshot().await?;

    if let Some(path) = &cli.save_snapshot {
        SnapshotTracker::save(&snapshot, path)
            .await
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        info!("Saved snapshot to {}", path.display());
    }

    let report = SprintAccountant::new(config)
        .account(&snapshot)
        .context("Failed to compute sprint statistics")?;

    match cli.format {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_args() {
        let cli = Cli::try_parse_from(["sprintstat", "1234", "2", "--token", "secret"]).unwrap();
        assert_eq!(cli.project_id, ProjectId::new(1234));
        assert_eq!(cli.sprint.get(), 2);

        let config = cli.accounting_config().unwrap();
        assert_eq!(config.split, EstimateSplit::Divide);
        assert_eq!(config.roster_level, AccessLevel::DEVELOPER);
        assert_eq!(config.unknown_members, UnknownMemberPolicy::Skip);
        assert_eq!(config.calendar, SprintCalendar::default());
    }

    #[test]
    fn test_parse_full_options() {
        let cli = Cli::try_parse_from([
            "sprintstat", "7", "3", "-e", "--strict", "--epoch", "2020-02-07 09:00",
            "--sprint-days", "7", "--access-level", "40", "--format", "json",
            "--snapshot", "data.json",
        ])
        .unwrap();
        let config = cli.accounting_config().unwrap();

        assert_eq!(config.split, EstimateSplit::Full);
        assert_eq!(config.unknown_members, UnknownMemberPolicy::Fail);
        assert_eq!(config.roster_level, AccessLevel::MAINTAINER);
        assert_eq!(config.calendar.length_days, 7);
        assert_eq!(config.calendar.epoch.to_string(), "2020-02-07 09:00:00");
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_sprint_zero_rejected() {
        assert!(Cli::try_parse_from(["sprintstat", "1", "0"]).is_err());
    }

    #[test]
    fn test_zero_sprint_days_rejected() {
        let cli = Cli::try_parse_from(["sprintstat", "1", "1", "--sprint-days", "0"]).unwrap();
        assert!(cli.accounting_config().is_err());
    }

    #[test]
    fn test_parse_epoch() {
        assert!(parse_epoch("2019-05-03T13:45:00").is_ok());
        assert!(parse_epoch("2019-05-03T13:45").is_ok());
        assert!(parse_epoch("2019-05-03").is_err());
    }
}
