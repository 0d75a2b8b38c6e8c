//! Time-log detection in free-text notes.
//!
//! GitLab records `/spend` commands as notes such as
//! `added 1h 30m of time spent at 2019-05-20`. The matcher decides whether a
//! note is such a log and extracts the duration it carries.

use regex::Regex;
use tracing::warn;

/// Duration extracted from one time-log note.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeLog {
    /// Signed duration in seconds
    pub seconds: i64,

    /// Tokens that looked like durations but could not be read
    pub skipped_tokens: Vec<String>,
}

/// Strategy for recognising time-log notes.
pub trait TimeLogMatcher: Send + Sync {
    /// `None` if the body is not a time log.
    fn parse(&self, body: &str) -> Option<TimeLog>;
}

/// Matcher for GitLab's time tracking notes.
///
/// The phrase pattern decides whether a note is a time log; a match on a
/// group named `verb` equal to `subtracted` negates the duration. Each unit
/// pattern is searched independently and only its first match counts; the
/// number is taken from capture group 1.
#[derive(Debug, Clone)]
pub struct GitLabTimeLogMatcher {
    phrase: Regex,
    units: Vec<(Regex, i64)>,
}

impl GitLabTimeLogMatcher {
    /// Default GitLab patterns.
    pub fn new() -> Self {
        Self::with_patterns(
            Regex::new(r"(?P<verb>added|subtracted) .* of time spent at").expect("valid regex"),
            Regex::new(r"\b([0-9]{1,3})h\b").expect("valid regex"),
            Regex::new(r"\b([0-9]{1,3})m\b").expect("valid regex"),
            Regex::new(r"\b([0-9]{1,3})s\b").expect("valid regex"),
        )
    }

    /// Custom phrase and hour/minute/second patterns.
    pub fn with_patterns(phrase: Regex, hours: Regex, minutes: Regex, seconds: Regex) -> Self {
        Self {
            phrase,
            units: vec![(hours, 3600), (minutes, 60), (seconds, 1)],
        }
    }
}

impl Default for GitLabTimeLogMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeLogMatcher for GitLabTimeLogMatcher {
    fn parse(&self, body: &str) -> Option<TimeLog> {
        let phrase = self.phrase.captures(body)?;
        let negate = phrase
            .name("verb")
            .map(|v| v.as_str() == "subtracted")
            .unwrap_or(false);

        let mut log = TimeLog::default();
        for (pattern, unit) in &self.units {
            let Some(caps) = pattern.captures(body) else {
                continue;
            };
            let token = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let digits = match caps.get(1) {
                Some(group) => group.as_str(),
                None => token.get(..token.len().saturating_sub(1)).unwrap_or_default(),
            };

            match digits.parse::<i64>() {
                Ok(value) => log.seconds += value * unit,
                Err(e) => {
                    warn!("Could not parse time token '{}' in note: {}", token, e);
                    log.skipped_tokens.push(token.to_string());
                }
            }
        }

        if negate {
            log.seconds = -log.seconds;
        }
        Some(log)
    }
}
