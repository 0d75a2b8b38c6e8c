//! Sprint windowing.
//!
//! Sprints are fixed-length periods anchored at an epoch instant. Sprint `i`
//! is the open interval `(epoch + (i-1)*length, epoch + i*length)`: both
//! boundaries are excluded, so an instant that falls exactly on a boundary
//! belongs to neither neighbouring sprint.
//!
//! Every predicate takes a `day_offset` that shifts the whole window by whole
//! days. The accounting uses it for the "next planning minus one day" cut-off.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use crate::{Date, Instant};

/// Default sprint length in days.
pub const DEFAULT_SPRINT_DAYS: i64 = 14;

/// Errors in sprint configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SprintError {
    /// Sprints are numbered from 1
    #[error("sprint index must be at least 1, got {0}")]
    InvalidIndex(i64),

    /// Sprint length must be positive
    #[error("sprint length must be at least one day, got {0}")]
    InvalidLength(i64),

    /// Sprint boundaries fall outside the representable date range
    #[error("sprint {sprint} of {length_days} days lies outside the supported date range")]
    OutOfRange {
        /// Requested sprint
        sprint: i64,
        /// Configured sprint length
        length_days: i64,
    },
}

/// A validated sprint number (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SprintIndex(u32);

impl SprintIndex {
    /// The first sprint.
    pub const FIRST: SprintIndex = SprintIndex(1);

    /// Validate a sprint number.
    pub fn new(index: i64) -> Result<Self, SprintError> {
        match u32::try_from(index) {
            Ok(i) if i >= 1 => Ok(Self(i)),
            _ => Err(SprintError::InvalidIndex(index)),
        }
    }

    /// The sprint number.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Sprint number as signed, for window arithmetic where `i - 1` may be 0.
    pub fn ordinal(&self) -> i64 {
        i64::from(self.0)
    }
}

impl TryFrom<i64> for SprintIndex {
    type Error = SprintError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SprintIndex> for i64 {
    fn from(index: SprintIndex) -> Self {
        index.ordinal()
    }
}

impl std::fmt::Display for SprintIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SprintIndex {
    type Err = SprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s.trim().parse().map_err(|_| SprintError::InvalidIndex(0))?;
        Self::new(raw)
    }
}

/// Epoch and length of the sprint cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintCalendar {
    /// Start of sprint 1
    pub epoch: Instant,

    /// Sprint length in days
    pub length_days: i64,
}

impl SprintCalendar {
    /// Create a calendar.
    pub fn new(epoch: Instant, length_days: i64) -> Result<Self, SprintError> {
        if length_days < 1 {
            return Err(SprintError::InvalidLength(length_days));
        }
        Ok(Self { epoch, length_days })
    }

    /// First instant of sprint `sprint` (exclusive), shifted by `day_offset` days.
    ///
    /// Saturates at the ends of the date range; see [`Self::check_sprint`].
    pub fn sprint_start(&self, sprint: i64, day_offset: i64) -> Instant {
        self.boundary(i128::from(sprint) - 1, day_offset)
            .unwrap_or_else(|saturated| saturated)
    }

    /// Last instant of sprint `sprint` (exclusive), shifted by `day_offset` days.
    ///
    /// Saturates at the ends of the date range; see [`Self::check_sprint`].
    pub fn sprint_end(&self, sprint: i64, day_offset: i64) -> Instant {
        self.boundary(i128::from(sprint), day_offset)
            .unwrap_or_else(|saturated| saturated)
    }

    /// Check that sprint `sprint` and its neighbours have representable bounds.
    pub fn check_sprint(&self, sprint: SprintIndex) -> Result<(), SprintError> {
        let i = i128::from(sprint.ordinal());
        // Bounds used by the accounting span from the start of `i - 1` to the end of `i + 1`
        if self.boundary(i - 2, 0).is_ok() && self.boundary(i + 1, 0).is_ok() {
            Ok(())
        } else {
            Err(SprintError::OutOfRange {
                sprint: sprint.ordinal(),
                length_days: self.length_days,
            })
        }
    }

    /// `epoch + (sprints * length + day_offset)` days, or the saturated
    /// `Instant::MIN`/`Instant::MAX` as the error when out of range.
    fn boundary(&self, sprints: i128, day_offset: i64) -> Result<Instant, Instant> {
        let days = sprints * i128::from(self.length_days) + i128::from(day_offset);
        let saturated = if days > 0 { Instant::MAX } else { Instant::MIN };
        i64::try_from(days)
            .ok()
            .and_then(Duration::try_days)
            .and_then(|d| self.epoch.checked_add_signed(d))
            .ok_or(saturated)
    }

    /// Whether `at` lies strictly inside sprint `sprint`.
    pub fn is_within_sprint(&self, at: Instant, sprint: i64, day_offset: i64) -> bool {
        self.sprint_start(sprint, day_offset) < at && at < self.sprint_end(sprint, day_offset)
    }

    /// Whether `at` lies strictly before the start of sprint `sprint`.
    pub fn is_before_sprint(&self, at: Instant, sprint: i64, day_offset: i64) -> bool {
        at < self.sprint_start(sprint, day_offset)
    }

    /// [`Self::is_within_sprint`] for a calendar date, taken at midnight.
    pub fn date_within_sprint(&self, date: Date, sprint: i64, day_offset: i64) -> bool {
        self.is_within_sprint(midnight(date), sprint, day_offset)
    }

    /// [`Self::is_before_sprint`] for a calendar date, taken at midnight.
    pub fn date_before_sprint(&self, date: Date, sprint: i64, day_offset: i64) -> bool {
        self.is_before_sprint(midnight(date), sprint, day_offset)
    }
}

impl Default for SprintCalendar {
    /// Friday 2019-05-03 13:45, two-week sprints.
    fn default() -> Self {
        let epoch = NaiveDate::from_ymd_opt(2019, 5, 3)
            .and_then(|d| d.and_hms_opt(13, 45, 0))
            .expect("default epoch is a valid date");
        Self {
            epoch,
            length_days: DEFAULT_SPRINT_DAYS,
        }
    }
}

fn midnight(date: Date) -> Instant {
    date.and_time(NaiveTime::MIN)
}
