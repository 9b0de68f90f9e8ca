//! Jenkins JSON API response shapes.

use chrono::{DateTime, Utc};
use failwatch_core::{Build, BuildRef, BuildResult};
use serde::de::IgnoredAny;
use serde::Deserialize;

/// Tree filter for roster pages; `{start,end}` is appended per page.
/// The nested `jobs[name]` marks containers whatever their class.
pub(crate) const JOBS_TREE: &str = "jobs[name,url,_class,jobs[name]]";
pub(crate) const BUILD_TREE: &str = "number,result,building,timestamp,url";
pub(crate) const BUILD_REFS_TREE: &str = "allBuilds[number,url]";

#[derive(Debug, Deserialize)]
pub(crate) struct JobList {
    #[serde(default)]
    pub jobs: Vec<JobEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobEntry {
    pub name: String,
    pub url: String,
    #[serde(rename = "_class", default)]
    pub class: Option<String>,
    /// Present only on entries that hold jobs of their own.
    #[serde(default)]
    pub jobs: Option<Vec<IgnoredAny>>,
}

impl JobEntry {
    /// Folders and multibranch projects hold jobs instead of builds.
    pub fn is_container(&self) -> bool {
        self.jobs.is_some()
            || self.class.as_deref().is_some_and(|c| {
                c.ends_with("Folder") || c.ends_with("MultiBranchProject")
            })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobColor {
    #[serde(default)]
    pub color: Option<String>,
}

impl JobColor {
    /// Jenkins paints disabled jobs `disabled` (or `disabled_anime`).
    pub fn is_enabled(&self) -> bool {
        !self
            .color
            .as_deref()
            .is_some_and(|c| c.starts_with("disabled"))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BuildList {
    #[serde(rename = "allBuilds", default)]
    pub all_builds: Vec<BuildRefEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BuildRefEntry {
    pub number: u64,
    #[serde(default)]
    pub url: String,
}

impl From<BuildRefEntry> for BuildRef {
    fn from(entry: BuildRefEntry) -> Self {
        BuildRef {
            number: entry.number,
            url: entry.url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BuildDetail {
    pub number: u64,
    pub result: Option<String>,
    #[serde(default)]
    pub building: bool,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
    pub url: String,
}

impl BuildDetail {
    pub fn into_build(self) -> Option<Build> {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(self.timestamp)?;
        Some(Build {
            number: self.number,
            result: BuildResult::from_status(self.result.as_deref(), self.building),
            timestamp,
            url: self.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_detail_conversion() {
        let detail: BuildDetail = serde_json::from_value(json!({
            "_class": "hudson.model.FreeStyleBuild",
            "number": 42,
            "result": "FAILURE",
            "building": false,
            "timestamp": 1714564800000i64,
            "url": "https://ci/job/api/42/"
        }))
        .unwrap();
        let build = detail.into_build().unwrap();
        assert_eq!(build.number, 42);
        assert_eq!(build.result, BuildResult::Failure);
        assert_eq!(build.timestamp.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn test_in_progress_build_has_null_result() {
        let detail: BuildDetail = serde_json::from_value(json!({
            "number": 7,
            "result": null,
            "building": true,
            "timestamp": 1714564800000i64,
            "url": "https://ci/job/api/7/"
        }))
        .unwrap();
        assert_eq!(detail.into_build().unwrap().result, BuildResult::Running);
    }

    #[test]
    fn test_disabled_colors() {
        for (color, enabled) in [
            (Some("blue"), true),
            (Some("red_anime"), true),
            (Some("disabled"), false),
            (Some("disabled_anime"), false),
            (None, true),
        ] {
            let c = JobColor {
                color: color.map(str::to_string),
            };
            assert_eq!(c.is_enabled(), enabled, "{:?}", color);
        }
    }

    #[test]
    fn test_container_classes() {
        let entry = |class: &str| JobEntry {
            name: "x".into(),
            url: "u".into(),
            class: Some(class.into()),
            jobs: None,
        };
        assert!(entry("com.cloudbees.hudson.plugins.folder.Folder").is_container());
        assert!(entry("jenkins.branch.OrganizationFolder").is_container());
        assert!(entry("org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject")
            .is_container());
        assert!(!entry("hudson.model.FreeStyleProject").is_container());
        assert!(!entry("org.jenkinsci.plugins.workflow.job.WorkflowJob").is_container());
    }

    #[test]
    fn test_nested_jobs_mark_a_container() {
        let entry: JobEntry = serde_json::from_value(json!({
            "name": "grp",
            "url": "https://ci/job/grp/",
            "jobs": [{ "name": "inner" }]
        }))
        .unwrap();
        assert!(entry.is_container());

        let empty: JobEntry = serde_json::from_value(json!({
            "name": "grp",
            "url": "https://ci/job/grp/",
            "jobs": []
        }))
        .unwrap();
        assert!(empty.is_container());

        let leaf: JobEntry = serde_json::from_value(json!({
            "_class": "hudson.model.FreeStyleProject",
            "name": "api",
            "url": "https://ci/job/api/"
        }))
        .unwrap();
        assert!(!leaf.is_container());
    }
}
