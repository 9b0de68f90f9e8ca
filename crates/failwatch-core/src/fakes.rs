//! In-memory fakes for the provider and clock traits (testing only)
//!
//! `MemoryBuildHistory` holds jobs and builds in insertion order, records
//! every call made against it, and can be told to fail specific calls.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::classify::Clock;
use crate::error::{ProviderError, ProviderResult};
use crate::model::{Build, BuildRef, BuildResult, Job};
use crate::provider::BuildHistory;

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A provider call made against a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    IsEnabled,
    LastBuild,
    BuildRefs,
    Build(u64),
    LastFailedBuild,
}

#[derive(Debug)]
struct Fault {
    call: Call,
    /// Successful calls to let through before failing.
    skip: usize,
    error: ProviderError,
}

#[derive(Debug)]
struct JobState {
    job: Job,
    enabled: bool,
    /// Ascending by build number.
    builds: Vec<Build>,
    faults: Vec<Fault>,
    calls: Vec<Call>,
}

#[derive(Debug, Default)]
struct State {
    jobs: Vec<JobState>,
    roster_error: Option<ProviderError>,
}

/// In-memory build history.
#[derive(Debug, Default)]
pub struct MemoryBuildHistory {
    state: Mutex<State>,
}

impl MemoryBuildHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an enabled job with no builds.
    pub fn add_job(&self, name: &str) -> Job {
        let job = Job::new(name, format!("memory://{}/", name));
        let mut state = self.state.lock().unwrap();
        state.jobs.push(JobState {
            job: job.clone(),
            enabled: true,
            builds: Vec::new(),
            faults: Vec::new(),
            calls: Vec::new(),
        });
        job
    }

    pub fn set_enabled(&self, job: &Job, enabled: bool) {
        self.with_job(job, |s| s.enabled = enabled);
    }

    /// Record a build. Builds may be pushed in any order.
    pub fn push_build(
        &self,
        job: &Job,
        number: u64,
        result: BuildResult,
        timestamp: DateTime<Utc>,
    ) -> Build {
        let build = Build {
            number,
            result,
            timestamp,
            url: format!("{}{}/", job.url, number),
        };
        self.with_job(job, |s| {
            s.builds.retain(|b| b.number != number);
            s.builds.push(build.clone());
            s.builds.sort_by_key(|b| b.number);
        });
        build
    }

    /// Make every `call` against `job` fail with `error`.
    pub fn fail(&self, job: &Job, call: Call, error: ProviderError) {
        self.fail_after(job, call, 0, error);
    }

    /// Let `skip` matching calls succeed, then fail the rest with `error`.
    pub fn fail_after(&self, job: &Job, call: Call, skip: usize, error: ProviderError) {
        self.with_job(job, |s| s.faults.push(Fault { call, skip, error }));
    }

    /// Shorthand for failing every `last_build` call.
    pub fn fail_last_build(&self, job: &Job, error: ProviderError) {
        self.fail(job, Call::LastBuild, error);
    }

    /// Make roster enumeration fail.
    pub fn fail_roster(&self, error: ProviderError) {
        self.state.lock().unwrap().roster_error = Some(error);
    }

    /// Calls made against `job`, in order.
    pub fn calls(&self, job: &Job) -> Vec<Call> {
        self.with_job(job, |s| s.calls.clone())
    }

    /// Calls other than the enabled check.
    pub fn history_calls(&self, job: &Job) -> usize {
        self.calls(job)
            .into_iter()
            .filter(|c| *c != Call::IsEnabled)
            .count()
    }

    /// Whether build `number` of `job` was ever fetched in full.
    pub fn fetched_build(&self, job: &Job, number: u64) -> bool {
        self.calls(job).contains(&Call::Build(number))
    }

    fn with_job<T>(&self, job: &Job, f: impl FnOnce(&mut JobState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .jobs
            .iter_mut()
            .find(|s| s.job.name == job.name)
            .unwrap_or_else(|| panic!("unknown job {}", job.name));
        f(entry)
    }

    /// Record `call` and run `f` unless a fault fires first.
    fn call<T>(
        &self,
        job: &Job,
        call: Call,
        f: impl FnOnce(&JobState) -> ProviderResult<T>,
    ) -> ProviderResult<T> {
        let mut state = self.state.lock().unwrap();
        let Some(entry) = state.jobs.iter_mut().find(|s| s.job.name == job.name) else {
            return Err(ProviderError::NotFound(job.name.clone()));
        };
        entry.calls.push(call);

        if let Some(fault) = entry.faults.iter_mut().find(|fault| fault.call == call) {
            if fault.skip == 0 {
                return Err(fault.error.clone());
            }
            fault.skip -= 1;
        }

        f(entry)
    }
}

fn not_found(job: &Job, what: &str) -> ProviderError {
    ProviderError::NotFound(format!("{} of {}", what, job.name))
}

#[async_trait]
impl BuildHistory for MemoryBuildHistory {
    async fn jobs(&self) -> ProviderResult<Vec<Job>> {
        let state = self.state.lock().unwrap();
        if let Some(e) = &state.roster_error {
            return Err(e.clone());
        }
        Ok(state.jobs.iter().map(|s| s.job.clone()).collect())
    }

    async fn is_enabled(&self, job: &Job) -> ProviderResult<bool> {
        self.call(job, Call::IsEnabled, |s| Ok(s.enabled))
    }

    async fn last_build(&self, job: &Job) -> ProviderResult<Build> {
        self.call(job, Call::LastBuild, |s| {
            s.builds
                .last()
                .cloned()
                .ok_or_else(|| not_found(job, "last build"))
        })
    }

    async fn build_refs(&self, job: &Job) -> ProviderResult<Vec<BuildRef>> {
        self.call(job, Call::BuildRefs, |s| {
            Ok(s.builds
                .iter()
                .rev()
                .map(|b| BuildRef {
                    number: b.number,
                    url: b.url.clone(),
                })
                .collect())
        })
    }

    async fn build(&self, job: &Job, number: u64) -> ProviderResult<Build> {
        self.call(job, Call::Build(number), |s| {
            s.builds
                .iter()
                .find(|b| b.number == number)
                .cloned()
                .ok_or_else(|| not_found(job, &format!("build #{}", number)))
        })
    }

    async fn last_failed_build(&self, job: &Job) -> ProviderResult<Build> {
        self.call(job, Call::LastFailedBuild, |s| {
            s.builds
                .iter()
                .rev()
                .find(|b| b.is_failure())
                .cloned()
                .ok_or_else(|| not_found(job, "last failed build"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refs_are_most_recent_first() {
        let history = MemoryBuildHistory::new();
        let job = history.add_job("a");
        let ts = Utc::now();
        history.push_build(&job, 2, BuildResult::Success, ts);
        history.push_build(&job, 1, BuildResult::Failure, ts);
        history.push_build(&job, 3, BuildResult::Failure, ts);

        let refs = history.build_refs(&job).await.unwrap();
        let numbers: Vec<u64> = refs.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
        assert_eq!(history.last_build(&job).await.unwrap().number, 3);
    }

    #[tokio::test]
    async fn test_fail_after_lets_calls_through() {
        let history = MemoryBuildHistory::new();
        let job = history.add_job("a");
        history.push_build(&job, 1, BuildResult::Failure, Utc::now());
        history.fail_after(
            &job,
            Call::LastBuild,
            1,
            ProviderError::Transport("down".into()),
        );

        assert!(history.last_build(&job).await.is_ok());
        assert!(history.last_build(&job).await.is_err());
        assert_eq!(history.calls(&job), vec![Call::LastBuild, Call::LastBuild]);
    }

    #[tokio::test]
    async fn test_never_built_job_is_not_found() {
        let history = MemoryBuildHistory::new();
        let job = history.add_job("empty");
        assert!(history.last_build(&job).await.unwrap_err().is_not_found());
        assert!(history
            .last_failed_build(&job)
            .await
            .unwrap_err()
            .is_not_found());
    }
}
