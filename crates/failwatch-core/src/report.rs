//! Classification reports.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::model::{Build, Job};

/// Why a job ended up in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Job state could not be read from the server.
    TransientError,

    /// Last build failed longer ago than the stale threshold.
    StaleFailure,

    /// Last build failed and so did the nearest earlier non-aborted build.
    ConsecutiveFailure,
}

impl Category {
    /// Rendering order. Summaries always follow this sequence.
    pub const ALL: [Category; 3] = [
        Category::TransientError,
        Category::StaleFailure,
        Category::ConsecutiveFailure,
    ];

    /// Section header used in the text summary.
    pub fn title(&self) -> &'static str {
        match self {
            Category::TransientError => {
                "Jobs whose status could not be confirmed due to a Jenkins error"
            }
            Category::StaleFailure => "Jobs that have been failed for over an hour",
            Category::ConsecutiveFailure => "Jobs that have failed more than once in a row",
        }
    }

    pub(crate) fn slot(&self) -> usize {
        match self {
            Category::TransientError => 0,
            Category::StaleFailure => 1,
            Category::ConsecutiveFailure => 2,
        }
    }
}

/// One alert-worthy finding for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureReport {
    pub job: Job,
    pub category: Category,

    /// Provider error behind a `TransientError` report.
    pub error: Option<ProviderError>,

    /// Failing build that triggered the verdict, when one was in hand.
    pub build: Option<Build>,
}

impl FailureReport {
    pub fn transient(job: &Job, error: ProviderError) -> Self {
        Self {
            job: job.clone(),
            category: Category::TransientError,
            error: Some(error),
            build: None,
        }
    }

    pub fn stale(job: &Job, build: Build) -> Self {
        Self {
            job: job.clone(),
            category: Category::StaleFailure,
            error: None,
            build: Some(build),
        }
    }

    pub fn consecutive(job: &Job, build: Build) -> Self {
        Self {
            job: job.clone(),
            category: Category::ConsecutiveFailure,
            error: None,
            build: Some(build),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_is_fixed() {
        assert_eq!(
            Category::ALL,
            [
                Category::TransientError,
                Category::StaleFailure,
                Category::ConsecutiveFailure
            ]
        );
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.slot(), i);
        }
    }

    #[test]
    fn test_titles() {
        assert_eq!(
            Category::StaleFailure.title(),
            "Jobs that have been failed for over an hour"
        );
        assert!(Category::TransientError.title().contains("Jenkins error"));
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let v = serde_json::to_value(Category::ConsecutiveFailure).unwrap();
        assert_eq!(v, serde_json::json!("consecutive_failure"));
    }
}
