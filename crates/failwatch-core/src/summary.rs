//! Report aggregation and summary rendering.
//!
//! Reports are bucketed by [`Category`] in the fixed order of
//! [`Category::ALL`]. Inside a bucket, reports keep the order in which jobs
//! were classified, so identical input always renders identical output.

use serde::Serialize;
use tracing::{debug, info};

use crate::classify::Classifier;
use crate::model::Job;
use crate::provider::BuildHistory;
use crate::report::{Category, FailureReport};

/// Line closing every summary section.
pub const SECTION_SEPARATOR: &str = "---";

/// Collects reports from a classification pass.
#[derive(Debug, Default)]
pub struct Aggregator {
    buckets: [Vec<FailureReport>; 3],
    checked: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every job in order, one at a time.
    pub async fn check_jobs(classifier: &Classifier<'_>, jobs: &[Job]) -> Self {
        let mut aggregator = Self::new();
        for job in jobs {
            let reports = classifier.classify(job).await;
            aggregator.record(reports);
        }
        info!(
            checked = aggregator.checked(),
            reports = aggregator.len(),
            "classification pass finished"
        );
        aggregator
    }

    /// Record the outcome of classifying one job.
    pub fn record(&mut self, reports: impl IntoIterator<Item = FailureReport>) {
        self.checked += 1;
        for report in reports {
            self.buckets[report.category.slot()].push(report);
        }
    }

    /// Number of jobs recorded.
    pub fn checked(&self) -> usize {
        self.checked
    }

    /// Total number of reports across all categories.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether anything warrants an alert.
    pub fn is_alerting(&self) -> bool {
        !self.is_empty()
    }

    pub fn reports(&self, category: Category) -> &[FailureReport] {
        &self.buckets[category.slot()]
    }

    /// Build the summary, looking up each job's last failed build URL.
    ///
    /// Lookups are best-effort: a failed lookup falls back to the build
    /// attached to the report, or to no URL at all.
    pub async fn summarize(&self, history: &dyn BuildHistory) -> Summary {
        let mut sections = Vec::new();

        for category in Category::ALL {
            let reports = self.reports(category);
            if reports.is_empty() {
                continue;
            }

            let mut entries = Vec::with_capacity(reports.len());
            for report in reports {
                let failed_build_url = match history.last_failed_build(&report.job).await {
                    Ok(build) => Some(build.url),
                    Err(e) => {
                        debug!(job = %report.job, error = %e, "no last failed build");
                        report
                            .build
                            .as_ref()
                            .filter(|b| b.is_failure())
                            .map(|b| b.url.clone())
                    }
                };
                entries.push(Entry {
                    job: report.job.name.clone(),
                    error: report.error.as_ref().map(ToString::to_string),
                    failed_build_url,
                });
            }

            sections.push(Section {
                category,
                title: category.title(),
                entries,
            });
        }

        Summary {
            checked: self.checked,
            alerting: self.is_alerting(),
            sections,
        }
    }
}

/// One job line group inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub job: String,
    pub error: Option<String>,
    pub failed_build_url: Option<String>,
}

/// A non-empty category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub category: Category,
    pub title: &'static str,
    pub entries: Vec<Entry>,
}

/// Rendered result of a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub checked: usize,
    pub alerting: bool,
    pub sections: Vec<Section>,
}

impl Summary {
    /// The grouped sections as plain text (empty when nothing alerts).
    pub fn sections_text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str(section.title);
            out.push('\n');
            for entry in &section.entries {
                if let Some(error) = &entry.error {
                    out.push_str(error);
                    out.push('\n');
                }
                out.push_str(&entry.job);
                out.push('\n');
                if let Some(url) = &entry.failed_build_url {
                    out.push_str(url);
                    out.push('\n');
                }
            }
            out.push_str(SECTION_SEPARATOR);
            out.push('\n');
        }
        out
    }

    /// Full text output for the terminal.
    pub fn render_text(&self) -> String {
        if self.alerting {
            self.sections_text()
        } else {
            format!("{} jobs checked, all healthy\n", self.checked)
        }
    }

    /// Process exit code: 0 when healthy, 1 when alerting.
    pub fn exit_code(&self) -> u8 {
        if self.alerting {
            1
        } else {
            0
        }
    }
}
