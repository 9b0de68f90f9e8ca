//! Build history provider trait
//!
//! The classifier never talks to a CI server directly. Everything it needs
//! goes through [`BuildHistory`], so the same logic runs against the Jenkins
//! HTTP client and against the in-memory fake in [`crate::fakes`].
//!
//! Contract:
//! - `last_build` returns `ProviderError::NotFound` for a job that has never
//!   been built; any other error means the data could not be read.
//! - `build_refs` returns references most-recent-first. Callers rely on that
//!   order and never re-sort.
//! - Each call is a single attempt. Implementations do not retry.

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::model::{Build, BuildRef, Job};

#[async_trait]
pub trait BuildHistory: Send + Sync {
    /// Enumerate every job in the roster, in server order.
    async fn jobs(&self) -> ProviderResult<Vec<Job>>;

    /// Whether the job is enabled (disabled jobs are never classified).
    async fn is_enabled(&self, job: &Job) -> ProviderResult<bool>;

    /// The job's newest build.
    async fn last_build(&self, job: &Job) -> ProviderResult<Build>;

    /// References to every build of the job, most recent first.
    async fn build_refs(&self, job: &Job) -> ProviderResult<Vec<BuildRef>>;

    /// Full detail of one build.
    async fn build(&self, job: &Job, number: u64) -> ProviderResult<Build>;

    /// The job's most recent failed build.
    async fn last_failed_build(&self, job: &Job) -> ProviderResult<Build>;
}
