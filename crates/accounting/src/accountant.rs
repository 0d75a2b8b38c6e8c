//! Sprint accounting over a fetched project snapshot.

use std::collections::HashSet;
use sprintstat_core::{ProjectSnapshot, SprintError};
use tracing::{debug, info};
use crate::accumulator::{Accumulator, AccountingConfig, IssueOutcome};
use crate::report::{ReportBuilder, SprintReport};
use crate::stats::StatsError;
use crate::timelog::{GitLabTimeLogMatcher, TimeLogMatcher};

/// Errors that abort an accounting run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountingError {
    /// An assignee or note author is not on the roster
    #[error("'{0}' is not on the roster")]
    UnknownMember(String),

    /// Statistics could not be computed
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// The sprint cannot be placed on the calendar
    #[error(transparent)]
    Sprint(#[from] SprintError),
}

/// Computes a [`SprintReport`] from a [`ProjectSnapshot`].
pub struct SprintAccountant<M: TimeLogMatcher = GitLabTimeLogMatcher> {
    config: AccountingConfig,
    matcher: M,
}

impl SprintAccountant<GitLabTimeLogMatcher> {
    /// Accountant with the GitLab note matcher.
    pub fn new(config: AccountingConfig) -> Self {
        Self::with_matcher(config, GitLabTimeLogMatcher::new())
    }
}

impl<M: TimeLogMatcher> SprintAccountant<M> {
    /// Accountant with a custom note matcher.
    pub fn with_matcher(config: AccountingConfig, matcher: M) -> Self {
        Self { config, matcher }
    }

    /// The configuration in use.
    pub fn config(&self) -> &AccountingConfig {
        &self.config
    }

    /// Run the accounting.
    ///
    /// Issues and notes are each visited once, even if the snapshot repeats
    /// them. Notes of a settled issue are not counted.
    pub fn account(&self, snapshot: &ProjectSnapshot) -> Result<SprintReport, AccountingError> {
        self.config.calendar.check_sprint(self.config.sprint)?;

        let roster = snapshot
            .members
            .iter()
            .filter(|m| m.access_level == self.config.roster_level)
            .map(|m| m.username.clone());
        let mut acc = Accumulator::new(&self.config, roster);
        info!(
            "Accounting sprint {} of project {} for {} {} members",
            self.config.sprint,
            snapshot.project,
            acc.totals().len(),
            self.config.roster_level
        );

        let mut builder = ReportBuilder::new();
        let mut seen_issues = HashSet::new();
        let mut seen_notes = HashSet::new();

        for record in &snapshot.issues {
            let issue = &record.issue;
            if !seen_issues.insert(issue.iid) {
                debug!("Issue {} listed twice; ignoring repeat", issue.iid);
                continue;
            }

            match acc.record_issue(issue)? {
                IssueOutcome::Settled => {
                    debug!("Issue {} was closed last sprint; skipped", issue.iid);
                    builder.issues_settled += 1;
                    continue;
                }
                IssueOutcome::Estimated => builder.issues_estimated += 1,
                IssueOutcome::AfterPlanning | IssueOutcome::Unassigned => {}
            }

            for note in &record.notes {
                if !seen_notes.insert(note.id) {
                    debug!("Note {} listed twice; ignoring repeat", note.id);
                    continue;
                }
                let Some(log) = self.matcher.parse(&note.body) else {
                    continue;
                };
                builder.time_logs += 1;
                builder.skipped_tokens += log.skipped_tokens.len();

                let placement = acc.record_time_log(&note.author, note.created_at, log.seconds)?;
                debug!(
                    "Issue {}: {}s by {} on {} -> {:?}",
                    issue.iid, log.seconds, note.author, note.created_at, placement
                );
            }
        }

        let (members, unknown) = acc.finish();
        Ok(builder.build(&self.config.calendar, self.config.sprint, members, unknown)?)
    }
}
