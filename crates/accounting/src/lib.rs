//! Sprint time accounting (estimate vs. time spent).
//!
//! Time-log parsing, per-member reconciliation, statistics and the report.

#![warn(missing_docs)]

pub mod timelog;
pub mod accumulator;
pub mod stats;
pub mod report;
pub mod accountant;

pub use timelog::{GitLabTimeLogMatcher, TimeLog, TimeLogMatcher};
pub use accumulator::{
    Accumulator, AccountingConfig, EstimateSplit, IssueOutcome, LogPlacement, MemberTotals,
    UnknownMemberPolicy,
};
pub use stats::{format_seconds, mean, std_dev, StatsError};
pub use report::{ReportBuilder, SprintReport, Summary};
pub use accountant::{AccountingError, SprintAccountant};
