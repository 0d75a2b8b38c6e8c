//! Per-member running totals and the reconciliation rule.
//!
//! Estimates are attributed per issue to its current assignees. Logged time
//! is attributed per note to its author: inside the target sprint it counts
//! as time spent, before the sprint it is taken back out of the author's
//! estimate, after the sprint it is ignored.

use std::collections::{BTreeSet, HashMap};
use serde::Serialize;
use sprintstat_core::{AccessLevel, Date, Issue, SprintCalendar, SprintIndex};
use tracing::{debug, warn};
use crate::accountant::AccountingError;

/// Issues created up to one day before the next sprint's planning count
/// towards this sprint's estimate.
const PLANNING_OFFSET_DAYS: i64 = -1;

/// How an issue's estimate is shared between its assignees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSplit {
    /// Each assignee gets `estimate / assignees`
    #[default]
    Divide,
    /// Each assignee gets the whole estimate
    Full,
}

/// What to do with an assignee or note author who is not on the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownMemberPolicy {
    /// Drop the contribution and warn once per username
    #[default]
    Skip,
    /// Abort the run
    Fail,
}

/// Accounting configuration.
#[derive(Debug, Clone)]
pub struct AccountingConfig {
    /// Epoch and sprint length
    pub calendar: SprintCalendar,

    /// Sprint to report on
    pub sprint: SprintIndex,

    /// Estimate sharing mode
    pub split: EstimateSplit,

    /// Access level a member must hold to be on the roster
    pub roster_level: AccessLevel,

    /// Policy for people not on the roster
    pub unknown_members: UnknownMemberPolicy,
}

impl AccountingConfig {
    /// Defaults for the given sprint.
    pub fn new(sprint: SprintIndex) -> Self {
        Self {
            sprint,
            ..Default::default()
        }
    }
}

impl Default for AccountingConfig {
    fn default() -> Self {
        Self {
            calendar: SprintCalendar::default(),
            sprint: SprintIndex::FIRST,
            split: EstimateSplit::Divide,
            roster_level: AccessLevel::DEVELOPER,
            unknown_members: UnknownMemberPolicy::Skip,
        }
    }
}

/// Running totals for one roster member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberTotals {
    /// Login name
    pub username: String,

    /// Outstanding estimate in seconds; may go negative
    pub time_estimate: f64,

    /// Time logged inside the sprint, in seconds
    pub actual_time_spent: i64,
}

impl MemberTotals {
    fn new(username: String) -> Self {
        Self {
            username,
            time_estimate: 0.0,
            actual_time_spent: 0,
        }
    }
}

/// Effect of one issue on the estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOutcome {
    /// Closed during the previous sprint; excluded entirely
    Settled,
    /// Created after this sprint's planning cut-off
    AfterPlanning,
    /// Nobody is assigned
    Unassigned,
    /// Estimate attributed to the assignees
    Estimated,
}

/// Where a time log landed relative to the sprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogPlacement {
    /// Inside the sprint: added to time spent
    Spent,
    /// Before the sprint: subtracted from the estimate
    ClawedBack,
    /// Anything else: ignored
    Ignored,
}

/// Per-member totals for one sprint.
pub struct Accumulator {
    calendar: SprintCalendar,
    sprint: SprintIndex,
    split: EstimateSplit,
    policy: UnknownMemberPolicy,
    members: Vec<MemberTotals>,
    index: HashMap<String, usize>,
    unknown: BTreeSet<String>,
}

impl Accumulator {
    /// Start all roster members at zero. Repeated usernames are kept once.
    pub fn new<I, S>(config: &AccountingConfig, roster: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut members = Vec::new();
        let mut index = HashMap::new();
        for username in roster {
            let username = username.into();
            if index.contains_key(&username) {
                continue;
            }
            index.insert(username.clone(), members.len());
            members.push(MemberTotals::new(username));
        }

        Self {
            calendar: config.calendar,
            sprint: config.sprint,
            split: config.split,
            policy: config.unknown_members,
            members,
            index,
            unknown: BTreeSet::new(),
        }
    }

    /// Apply an issue's estimate.
    ///
    /// Uses the issue's current assignees, whoever held it at planning time.
    pub fn record_issue(&mut self, issue: &Issue) -> Result<IssueOutcome, AccountingError> {
        if self.is_settled(issue) {
            return Ok(IssueOutcome::Settled);
        }

        let sprint = self.sprint.ordinal();
        if !self
            .calendar
            .date_before_sprint(issue.created_at, sprint + 1, PLANNING_OFFSET_DAYS)
        {
            return Ok(IssueOutcome::AfterPlanning);
        }
        if issue.assignees.is_empty() {
            return Ok(IssueOutcome::Unassigned);
        }

        let estimate = issue.time_estimate as f64;
        let share = match self.split {
            EstimateSplit::Divide => estimate / issue.assignees.len() as f64,
            EstimateSplit::Full => estimate,
        };
        for assignee in &issue.assignees {
            if let Some(member) = self.member_mut(assignee)? {
                member.time_estimate += share;
            }
        }
        debug!("Issue {}: {}s estimate over {} assignees", issue.iid, issue.time_estimate, issue.assignees.len());

        Ok(IssueOutcome::Estimated)
    }

    /// Whether the issue was closed during the previous sprint.
    pub fn is_settled(&self, issue: &Issue) -> bool {
        issue
            .close_date()
            .map(|closed| self.calendar.date_within_sprint(closed, self.sprint.ordinal() - 1, 0))
            .unwrap_or(false)
    }

    /// Apply one time-log note of `seconds` written by `author` on `date`.
    pub fn record_time_log(
        &mut self,
        author: &str,
        date: Date,
        seconds: i64,
    ) -> Result<LogPlacement, AccountingError> {
        let sprint = self.sprint.ordinal();
        let placement = if self.calendar.date_within_sprint(date, sprint, 0) {
            LogPlacement::Spent
        } else if self.calendar.date_before_sprint(date, sprint, 0) {
            LogPlacement::ClawedBack
        } else {
            LogPlacement::Ignored
        };

        match placement {
            LogPlacement::Spent => {
                if let Some(member) = self.member_mut(author)? {
                    member.actual_time_spent += seconds;
                }
            }
            LogPlacement::ClawedBack => {
                if let Some(member) = self.member_mut(author)? {
                    member.time_estimate -= seconds as f64;
                }
            }
            LogPlacement::Ignored => {}
        }

        Ok(placement)
    }

    /// Totals in roster order.
    pub fn totals(&self) -> &[MemberTotals] {
        &self.members
    }

    /// Usernames that were referenced but not on the roster.
    pub fn unknown_members(&self) -> impl Iterator<Item = &str> {
        self.unknown.iter().map(|s| s.as_str())
    }

    /// Consume into totals and unknown usernames.
    pub fn finish(self) -> (Vec<MemberTotals>, Vec<String>) {
        (self.members, self.unknown.into_iter().collect())
    }

    fn member_mut(&mut self, username: &str) -> Result<Option<&mut MemberTotals>, AccountingError> {
        if let Some(&i) = self.index.get(username) {
            return Ok(Some(&mut self.members[i]));
        }

        match self.policy {
            UnknownMemberPolicy::Fail => Err(AccountingError::UnknownMember(username.to_string())),
            UnknownMemberPolicy::Skip => {
                if self.unknown.insert(username.to_string()) {
                    warn!("'{}' is not on the roster; their time is not counted", username);
                }
                Ok(None)
            }
        }
    }
}
