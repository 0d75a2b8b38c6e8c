//! Project membership as reported by the tracker.

use serde::{Deserialize, Serialize};

/// Permission level of a project member.
///
/// The numeric values follow GitLab's enumeration; other trackers map
/// their roles onto these levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLevel(u32);

impl AccessLevel {
    /// Read-only guest
    pub const GUEST: AccessLevel = AccessLevel(10);
    /// Reporter (can open issues)
    pub const REPORTER: AccessLevel = AccessLevel(20);
    /// Developer
    pub const DEVELOPER: AccessLevel = AccessLevel(30);
    /// Maintainer
    pub const MAINTAINER: AccessLevel = AccessLevel(40);
    /// Owner
    pub const OWNER: AccessLevel = AccessLevel(50);

    /// Wrap a raw level.
    pub fn new(level: u32) -> Self {
        Self(level)
    }

    /// The raw numeric level.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for AccessLevel {
    fn default() -> Self {
        Self::DEVELOPER
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match *self {
            Self::GUEST => "guest",
            Self::REPORTER => "reporter",
            Self::DEVELOPER => "developer",
            Self::MAINTAINER => "maintainer",
            Self::OWNER => "owner",
            _ => return write!(f, "level {}", self.0),
        };
        f.write_str(name)
    }
}

/// A member of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    /// Login name, unique on the tracker
    pub username: String,

    /// Permission level in this project
    pub access_level: AccessLevel,
}

impl ProjectMember {
    /// Create a member entry.
    pub fn new(username: impl Into<String>, access_level: AccessLevel) -> Self {
        Self {
            username: username.into(),
            access_level,
        }
    }
}
