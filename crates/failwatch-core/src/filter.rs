//! Job name exclusion.

use regex::Regex;

use crate::error::FilterError;
use crate::model::Job;

/// Drops jobs whose name matches a pattern.
#[derive(Debug, Clone)]
pub struct JobFilter {
    exclude: Option<Regex>,
}

impl JobFilter {
    /// A filter that keeps every job.
    pub fn keep_all() -> Self {
        Self { exclude: None }
    }

    /// Exclude jobs whose name matches `pattern` anywhere.
    pub fn exclude(pattern: &str) -> Result<Self, FilterError> {
        let re = Regex::new(pattern).map_err(|source| FilterError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { exclude: Some(re) })
    }

    /// `exclude` for a non-empty pattern, `keep_all` otherwise.
    pub fn from_pattern(pattern: Option<&str>) -> Result<Self, FilterError> {
        match pattern {
            Some(p) if !p.is_empty() => Self::exclude(p),
            _ => Ok(Self::keep_all()),
        }
    }

    pub fn keeps(&self, job: &Job) -> bool {
        self.exclude
            .as_ref()
            .map_or(true, |re| !re.is_match(&job.name))
    }

    /// Remove excluded jobs, preserving order.
    pub fn apply(&self, jobs: Vec<Job>) -> Vec<Job> {
        jobs.into_iter().filter(|j| self.keeps(j)).collect()
    }
}
