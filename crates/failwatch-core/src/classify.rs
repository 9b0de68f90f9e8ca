//! Failure classification for a single job.
//!
//! A job is alert-worthy when its last build failed and either
//! - the failure is older than the stale threshold, or
//! - the nearest earlier build that was not aborted also failed.
//!
//! Provider errors never abort the whole pass. They become
//! [`Category::TransientError`] reports for the job being checked.
//!
//! [`Category::TransientError`]: crate::report::Category::TransientError

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info_span, warn, Instrument};

use crate::error::ProviderResult;
use crate::model::{BuildResult, Job};
use crate::provider::BuildHistory;
use crate::report::FailureReport;

/// Default age, in minutes, after which a failed last build counts as stale.
pub const DEFAULT_STALE_AFTER_MINUTES: i64 = 60;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Classifies jobs against a build history provider.
pub struct Classifier<'a> {
    history: &'a dyn BuildHistory,
    clock: Box<dyn Clock + 'a>,
    stale_after: Duration,
}

impl<'a> Classifier<'a> {
    pub fn new(history: &'a dyn BuildHistory) -> Self {
        Self {
            history,
            clock: Box::new(SystemClock),
            stale_after: Duration::minutes(DEFAULT_STALE_AFTER_MINUTES),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'a) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Classify one job.
    ///
    /// Returns an empty vec for healthy, running, disabled, and never-built
    /// jobs. A job normally yields at most one report; it can yield two
    /// `TransientError` reports when both the stale and the consecutive
    /// probes fail to read their data.
    pub async fn classify(&self, job: &Job) -> Vec<FailureReport> {
        self.classify_inner(job)
            .instrument(info_span!("classify", job = %job.name))
            .await
    }

    async fn classify_inner(&self, job: &Job) -> Vec<FailureReport> {
        let mut reports = Vec::new();

        match self.history.is_enabled(job).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("job disabled, skipping");
                return reports;
            }
            Err(e) => {
                warn!(error = %e, "could not read enabled flag");
                reports.push(FailureReport::transient(job, e));
                return reports;
            }
        }

        let last = match self.history.last_build(job).await {
            Ok(build) => build,
            Err(e) if e.is_not_found() => {
                debug!("job has never been built, skipping");
                return reports;
            }
            Err(e) => {
                warn!(error = %e, "could not fetch last build");
                reports.push(FailureReport::transient(job, e));
                return reports;
            }
        };

        if last.result != BuildResult::Failure {
            debug!(build = last.number, result = %last.result, "last build not failed");
            return reports;
        }

        match self.is_stale_failure(job).await {
            Ok(true) => {
                debug!(build = last.number, "stale failure");
                reports.push(FailureReport::stale(job, last));
                return reports;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "stale check failed");
                reports.push(FailureReport::transient(job, e));
            }
        }

        match self.is_consecutive_failure(job).await {
            Ok(true) => {
                debug!(build = last.number, "consecutive failure");
                reports.push(FailureReport::consecutive(job, last));
            }
            Ok(false) => {
                debug!(build = last.number, "isolated failure");
            }
            Err(e) => {
                warn!(error = %e, "consecutive check failed");
                reports.push(FailureReport::transient(job, e));
            }
        }

        reports
    }

    /// Whether the job's last build is older than the stale threshold.
    ///
    /// Fetches the last build again instead of reusing the caller's copy.
    pub async fn is_stale_failure(&self, job: &Job) -> ProviderResult<bool> {
        let last = self.history.last_build(job).await?;
        Ok(self.clock.now() - last.timestamp > self.stale_after)
    }

    /// Whether the last build's nearest earlier non-aborted build failed too.
    ///
    /// Walks build references newest first, skipping the last build itself:
    /// - `Failure` confirms the streak,
    /// - `Aborted` is skipped,
    /// - `Success` breaks the streak,
    /// - `Running` or `Unknown` ends the walk without evidence of a streak.
    pub async fn is_consecutive_failure(&self, job: &Job) -> ProviderResult<bool> {
        let refs = self.history.build_refs(job).await?;
        if refs.is_empty() {
            return Ok(false);
        }

        let last = self.history.last_build(job).await?;

        for build_ref in refs.iter().filter(|r| r.number != last.number) {
            let build = self.history.build(job, build_ref.number).await?;
            match build.result {
                BuildResult::Failure => return Ok(true),
                BuildResult::Aborted => continue,
                BuildResult::Success => return Ok(false),
                BuildResult::Running | BuildResult::Unknown => {
                    debug!(build = build.number, result = %build.result, "walk stopped");
                    return Ok(false);
                }
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::fakes::{FixedClock, MemoryBuildHistory};
    use crate::report::Category;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[tokio::test]
    async fn test_stale_threshold_is_strict() {
        let history = MemoryBuildHistory::new();
        let job = history.add_job("edge");
        history.push_build(&job, 1, BuildResult::Failure, now() - Duration::hours(1));

        let classifier = Classifier::new(&history).with_clock(FixedClock(now()));
        assert!(!classifier.is_stale_failure(&job).await.unwrap());

        let classifier = Classifier::new(&history)
            .with_clock(FixedClock(now() + Duration::seconds(1)));
        assert!(classifier.is_stale_failure(&job).await.unwrap());
    }

    #[tokio::test]
    async fn test_custom_stale_threshold() {
        let history = MemoryBuildHistory::new();
        let job = history.add_job("nightly");
        history.push_build(&job, 1, BuildResult::Failure, now() - Duration::minutes(20));

        let classifier = Classifier::new(&history)
            .with_clock(FixedClock(now()))
            .with_stale_after(Duration::minutes(15));
        let reports = classifier.classify(&job).await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].category, Category::StaleFailure);
    }

    #[tokio::test]
    async fn test_stale_check_error_propagates() {
        let history = MemoryBuildHistory::new();
        let job = history.add_job("flaky");
        history.fail_last_build(&job, ProviderError::Transport("reset".into()));

        let classifier = Classifier::new(&history).with_clock(FixedClock(now()));
        let err = classifier.is_stale_failure(&job).await.unwrap_err();
        assert_eq!(err, ProviderError::Transport("reset".into()));
    }

    #[tokio::test]
    async fn test_empty_refs_is_not_consecutive() {
        let history = MemoryBuildHistory::new();
        let job = history.add_job("fresh");

        let classifier = Classifier::new(&history).with_clock(FixedClock(now()));
        assert!(!classifier.is_consecutive_failure(&job).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_older_build_stops_walk() {
        let history = MemoryBuildHistory::new();
        let job = history.add_job("unstable");
        let recent = now() - Duration::minutes(5);
        history.push_build(&job, 1, BuildResult::Failure, recent);
        history.push_build(&job, 2, BuildResult::Unknown, recent);
        history.push_build(&job, 3, BuildResult::Failure, recent);

        let classifier = Classifier::new(&history).with_clock(FixedClock(now()));
        assert!(!classifier.is_consecutive_failure(&job).await.unwrap());
        assert!(!history.fetched_build(&job, 1));
    }
}
