//! Jobs and builds as seen by the classifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A CI job in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Full job name, unique within the roster (folders joined with `/`).
    pub name: String,

    /// Detail URL of the job.
    pub url: String,
}

impl Job {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Outcome of a single build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildResult {
    Success,
    Failure,
    Aborted,
    Running,
    /// Any status string the classifier does not recognise.
    Unknown,
}

impl BuildResult {
    /// Map a server status string onto a result.
    ///
    /// `building` wins over whatever `result` says; an in-progress build has
    /// no terminal result yet.
    pub fn from_status(result: Option<&str>, building: bool) -> Self {
        if building {
            return BuildResult::Running;
        }
        match result {
            Some("SUCCESS") => BuildResult::Success,
            Some("FAILURE") => BuildResult::Failure,
            Some("ABORTED") => BuildResult::Aborted,
            Some("RUNNING") => BuildResult::Running,
            _ => BuildResult::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildResult::Success => "success",
            BuildResult::Failure => "failure",
            BuildResult::Aborted => "aborted",
            BuildResult::Running => "running",
            BuildResult::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for BuildResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lightweight reference to a build, used to walk history without
/// fetching every build body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRef {
    pub number: u64,
    pub url: String,
}

/// Full detail of one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    /// Build number, unique and increasing within a job.
    pub number: u64,

    pub result: BuildResult,

    /// Start time reported by the server.
    pub timestamp: DateTime<Utc>,

    /// Detail URL.
    pub url: String,
}

impl Build {
    pub fn is_failure(&self) -> bool {
        self.result == BuildResult::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_flag_overrides_result() {
        assert_eq!(
            BuildResult::from_status(None, true),
            BuildResult::Running
        );
        assert_eq!(
            BuildResult::from_status(Some("FAILURE"), true),
            BuildResult::Running
        );
    }

    #[test]
    fn test_known_statuses() {
        assert_eq!(
            BuildResult::from_status(Some("SUCCESS"), false),
            BuildResult::Success
        );
        assert_eq!(
            BuildResult::from_status(Some("FAILURE"), false),
            BuildResult::Failure
        );
        assert_eq!(
            BuildResult::from_status(Some("ABORTED"), false),
            BuildResult::Aborted
        );
    }

    #[test]
    fn test_unrecognised_status_is_unknown() {
        assert_eq!(
            BuildResult::from_status(Some("UNSTABLE"), false),
            BuildResult::Unknown
        );
        assert_eq!(
            BuildResult::from_status(Some("NOT_BUILT"), false),
            BuildResult::Unknown
        );
        assert_eq!(BuildResult::from_status(None, false), BuildResult::Unknown);
    }
}
