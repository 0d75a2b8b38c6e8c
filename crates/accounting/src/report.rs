//! Sprint report: per-member lines and summary statistics.

use std::fmt;
use serde::Serialize;
use sprintstat_core::{Instant, SprintCalendar, SprintIndex};
use crate::accumulator::MemberTotals;
use crate::stats::{format_seconds, mean, std_dev, StatsError};

/// Mean and standard deviation across the roster, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Mean time spent
    pub mean_time_spent: i64,
    /// Standard deviation of time spent
    pub std_time_spent: i64,
    /// Mean outstanding estimate
    pub mean_time_estimate: i64,
    /// Standard deviation of outstanding estimate
    pub std_time_estimate: i64,
}

impl Summary {
    /// Summarise member totals; fails on an empty roster.
    pub fn from_totals(members: &[MemberTotals]) -> Result<Self, StatsError> {
        let spent: Vec<f64> = members.iter().map(|m| m.actual_time_spent as f64).collect();
        let estimate: Vec<f64> = members.iter().map(|m| m.time_estimate).collect();

        Ok(Self {
            mean_time_spent: mean(&spent)?,
            std_time_spent: std_dev(&spent)?,
            mean_time_estimate: mean(&estimate)?,
            std_time_estimate: std_dev(&estimate)?,
        })
    }
}

/// The finished report for one sprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintReport {
    /// Reported sprint
    pub sprint: SprintIndex,

    /// Sprint start
    pub starts_at: Instant,

    /// Sprint end
    pub ends_at: Instant,

    /// Per-member totals, in roster order
    pub members: Vec<MemberTotals>,

    /// Roster statistics
    pub summary: Summary,

    /// Issues whose estimate was attributed
    pub issues_estimated: usize,

    /// Issues excluded as closed in the previous sprint
    pub issues_settled: usize,

    /// Time-log notes found
    pub time_logs: usize,

    /// Duration tokens that could not be read
    pub skipped_tokens: usize,

    /// People referenced by issues or notes but not on the roster
    pub unknown_members: Vec<String>,
}

/// Collects run counters and builds a [`SprintReport`].
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    /// Issues whose estimate was attributed
    pub issues_estimated: usize,
    /// Issues excluded as settled
    pub issues_settled: usize,
    /// Time-log notes found
    pub time_logs: usize,
    /// Unreadable duration tokens
    pub skipped_tokens: usize,
}

impl ReportBuilder {
    /// Empty counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the summary and assemble the report.
    pub fn build(
        self,
        calendar: &SprintCalendar,
        sprint: SprintIndex,
        members: Vec<MemberTotals>,
        unknown_members: Vec<String>,
    ) -> Result<SprintReport, StatsError> {
        let summary = Summary::from_totals(&members)?;
        Ok(SprintReport {
            sprint,
            starts_at: calendar.sprint_start(sprint.ordinal(), 0),
            ends_at: calendar.sprint_end(sprint.ordinal(), 0),
            members,
            summary,
            issues_estimated: self.issues_estimated,
            issues_settled: self.issues_settled,
            time_logs: self.time_logs,
            skipped_tokens: self.skipped_tokens,
            unknown_members,
        })
    }
}

impl fmt::Display for SprintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(
            f,
            "Time data for sprint {} starting at {}",
            self.sprint,
            self.starts_at.format("%Y-%m-%d %H:%M")
        )?;
        writeln!(f)?;

        for m in &self.members {
            let estimate = format!("time_estimate: {}", format_seconds(m.time_estimate));
            let spent = format!(
                "actual_time_spent: {}",
                format_seconds(m.actual_time_spent as f64)
            );
            writeln!(f, "{:40} {:25} {:25}", m.username, estimate, spent)?;
        }
        writeln!(f)?;

        let s = &self.summary;
        writeln!(f, "   Mean time spent:  {}", format_seconds(s.mean_time_spent as f64))?;
        writeln!(f, "    Std time spent:  {}", format_seconds(s.std_time_spent as f64))?;
        writeln!(f, "Mean time estimate:  {}", format_seconds(s.mean_time_estimate as f64))?;
        writeln!(f, " Std time estimate:  {}", format_seconds(s.std_time_estimate as f64))?;

        if !self.unknown_members.is_empty() {
            writeln!(f)?;
            writeln!(f, "Not on the roster: {}", self.unknown_members.join(", "))?;
        }
        if self.skipped_tokens > 0 {
            writeln!(f, "Unreadable time tokens skipped: {}", self.skipped_tokens)?;
        }
        Ok(())
    }
}
