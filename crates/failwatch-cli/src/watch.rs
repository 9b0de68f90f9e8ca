//! One full pass over the roster.

use failwatch_core::{
    Aggregator, BuildHistory, Classifier, JobFilter, ProviderResult, Summary,
};
use tracing::info;

/// Enumerate, filter, classify, and summarise.
///
/// Only roster enumeration can fail the pass; per-job problems end up in
/// the summary as transient errors.
pub async fn check_roster(
    history: &dyn BuildHistory,
    filter: &JobFilter,
    stale_after: chrono::Duration,
) -> ProviderResult<Summary> {
    let roster = history.jobs().await?;
    let total = roster.len();
    let jobs = filter.apply(roster);
    info!(total, kept = jobs.len(), "roster loaded");

    let classifier = Classifier::new(history).with_stale_after(stale_after);
    let aggregator = Aggregator::check_jobs(&classifier, &jobs).await;
    Ok(aggregator.summarize(history).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use failwatch_core::fakes::MemoryBuildHistory;
    use failwatch_core::{BuildResult, Category, ProviderError};

    #[tokio::test]
    async fn test_excluded_jobs_are_never_checked() {
        let history = MemoryBuildHistory::new();
        let old = Utc::now() - Duration::days(2);
        let sandbox = history.add_job("sandbox-experiment");
        history.push_build(&sandbox, 1, BuildResult::Failure, old);
        let deploy = history.add_job("deploy");
        history.push_build(&deploy, 1, BuildResult::Failure, old);

        let filter = JobFilter::exclude("^sandbox-").unwrap();
        let summary = check_roster(&history, &filter, Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(summary.checked, 1);
        assert_eq!(summary.sections.len(), 1);
        assert_eq!(summary.sections[0].category, Category::StaleFailure);
        assert_eq!(summary.sections[0].entries[0].job, "deploy");
        assert!(history.calls(&sandbox).is_empty());
    }

    #[tokio::test]
    async fn test_roster_error_fails_the_pass() {
        let history = MemoryBuildHistory::new();
        history.fail_roster(ProviderError::Unauthorized("401".into()));

        let err = check_roster(&history, &JobFilter::keep_all(), Duration::hours(1))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::Unauthorized("401".into()));
    }

    #[tokio::test]
    async fn test_healthy_roster() {
        let history = MemoryBuildHistory::new();
        for name in ["a", "b", "c"] {
            let job = history.add_job(name);
            history.push_build(&job, 1, BuildResult::Success, Utc::now());
        }

        let summary = check_roster(&history, &JobFilter::keep_all(), Duration::hours(1))
            .await
            .unwrap();
        assert!(!summary.alerting);
        assert_eq!(summary.render_text(), "3 jobs checked, all healthy\n");
    }
}
