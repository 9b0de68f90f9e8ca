//! failwatch-core: failure classification for CI job rosters
//!
//! Decides, per job, whether the job is healthy, unreadable, stale-failing,
//! or consecutively failing, and aggregates the verdicts into a summary.
//!
//! ## Key Components
//!
//! - [`BuildHistory`]: what the classifier needs from a CI server
//! - [`Classifier`]: per-job verdicts
//! - [`Aggregator`] / [`Summary`]: grouping and rendering in fixed category order
//! - [`JobFilter`]: name-pattern exclusion applied before classification

pub mod classify;
mod error;
pub mod fakes;
pub mod filter;
pub mod model;
pub mod provider;
pub mod report;
pub mod summary;
pub mod telemetry;

pub use classify::{Classifier, Clock, SystemClock, DEFAULT_STALE_AFTER_MINUTES};
pub use error::{FilterError, ProviderError, ProviderResult};
pub use filter::JobFilter;
pub use model::{Build, BuildRef, BuildResult, Job};
pub use provider::BuildHistory;
pub use report::{Category, FailureReport};
pub use summary::{Aggregator, Entry, Section, Summary, SECTION_SEPARATOR};
pub use telemetry::init_tracing;

/// failwatch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
