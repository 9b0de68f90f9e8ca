//! Jenkins JSON API client
//!
//! Implements [`BuildHistory`] over the `/api/json` endpoints. Every method
//! issues exactly one request per data point (roster enumeration issues one
//! per page and per folder); nothing is retried.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use failwatch_core::{Build, BuildHistory, BuildRef, Job, ProviderResult};
use futures::future::{BoxFuture, FutureExt};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{BuildDetail, BuildList, JobColor, JobList, BUILD_REFS_TREE, BUILD_TREE, JOBS_TREE};
use crate::auth::AuthMethod;
use crate::error::JenkinsError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of jobs fetched per roster page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Jenkins connection settings
#[derive(Debug, Clone)]
pub struct JenkinsConfig {
    /// Server root, e.g. `https://ci.example.com/jenkins`
    pub base_url: String,
    pub auth: AuthMethod,
    pub timeout: Duration,
    /// Roster page size; `0` fetches each folder in one request.
    pub page_size: usize,
}

impl JenkinsConfig {
    pub fn new(base_url: &str, auth: AuthMethod) -> Self {
        JenkinsConfig {
            base_url: base_url.to_string(),
            auth,
            timeout: DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Jenkins client
pub struct JenkinsClient {
    base_url: Url,
    auth: AuthMethod,
    page_size: usize,
    http: reqwest::Client,
}

impl JenkinsClient {
    pub fn new(config: JenkinsConfig) -> Result<Self, JenkinsError> {
        let base_url = parse_base_url(&config.base_url)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("failwatch/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(JenkinsClient {
            base_url,
            auth: config.auth,
            page_size: config.page_size,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// GET `{resource}api/json` and decode the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        tree: Option<&str>,
    ) -> Result<T, JenkinsError> {
        let url = api_url(resource);
        debug!(url = %url, tree = tree.unwrap_or(""), "GET");

        let mut req = self.http.get(&url);
        if let Some(tree) = tree {
            req = req.query(&[("tree", tree)]);
        }
        let resp = self.auth.apply(req).send().await?;

        let status = resp.status();
        match status {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Err(JenkinsError::NotFound { url }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(JenkinsError::Unauthorized {
                    status: status.as_u16(),
                    url,
                })
            }
            _ => {
                return Err(JenkinsError::Status {
                    status: status.as_u16(),
                    url,
                })
            }
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| JenkinsError::Decode {
            url,
            message: e.to_string(),
        })
    }

    async fn get_build(&self, resource: String) -> Result<Build, JenkinsError> {
        let detail: BuildDetail = self.get_json(&resource, Some(BUILD_TREE)).await?;
        let timestamp = detail.timestamp;
        detail.into_build().ok_or_else(|| JenkinsError::Decode {
            url: api_url(&resource),
            message: format!("timestamp {} out of range", timestamp),
        })
    }

    /// Append every job under `container` to `out`, depth first.
    ///
    /// Paging ends on a short page, or on a page with no entry not already
    /// seen in this container (servers that ignore the range repeat pages).
    fn collect_jobs<'a>(
        &'a self,
        container: String,
        prefix: Option<String>,
        out: &'a mut Vec<Job>,
    ) -> BoxFuture<'a, Result<(), JenkinsError>> {
        async move {
            let mut seen = HashSet::new();
            let mut start = 0usize;
            loop {
                let end = start.checked_add(self.page_size);
                let tree = match end {
                    Some(end) if self.page_size > 0 => {
                        format!("{}{{{},{}}}", JOBS_TREE, start, end)
                    }
                    _ => JOBS_TREE.to_string(),
                };
                let page: JobList = self.get_json(&container, Some(&tree)).await?;
                let fetched = page.jobs.len();
                let mut fresh = 0usize;

                for entry in page.jobs {
                    if !seen.insert(entry.url.clone()) {
                        continue;
                    }
                    fresh += 1;
                    let name = match &prefix {
                        Some(p) => format!("{}/{}", p, entry.name),
                        None => entry.name.clone(),
                    };
                    if entry.is_container() {
                        self.collect_jobs(entry.url, Some(name), out).await?;
                    } else {
                        out.push(Job::new(name, entry.url));
                    }
                }

                let Some(next) = end.filter(|_| self.page_size > 0) else {
                    return Ok(());
                };
                if fetched < self.page_size || fresh == 0 {
                    return Ok(());
                }
                if fresh < fetched {
                    debug!(container = %container, start, "page repeated earlier entries");
                }
                start = next;
            }
        }
        .boxed()
    }
}

#[async_trait]
impl BuildHistory for JenkinsClient {
    async fn jobs(&self) -> ProviderResult<Vec<Job>> {
        let mut jobs = Vec::new();
        self.collect_jobs(self.base_url.to_string(), None, &mut jobs)
            .await?;
        debug!(count = jobs.len(), "roster fetched");
        Ok(jobs)
    }

    async fn is_enabled(&self, job: &Job) -> ProviderResult<bool> {
        let color: JobColor = self.get_json(&job.url, Some("color")).await?;
        Ok(color.is_enabled())
    }

    async fn last_build(&self, job: &Job) -> ProviderResult<Build> {
        Ok(self.get_build(child(&job.url, "lastBuild")).await?)
    }

    async fn build_refs(&self, job: &Job) -> ProviderResult<Vec<BuildRef>> {
        let list: BuildList = self.get_json(&job.url, Some(BUILD_REFS_TREE)).await?;
        Ok(list.all_builds.into_iter().map(BuildRef::from).collect())
    }

    async fn build(&self, job: &Job, number: u64) -> ProviderResult<Build> {
        Ok(self.get_build(child(&job.url, &number.to_string())).await?)
    }

    async fn last_failed_build(&self, job: &Job) -> ProviderResult<Build> {
        Ok(self.get_build(child(&job.url, "lastFailedBuild")).await?)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, JenkinsError> {
    let url = Url::parse(&with_slash(raw)).map_err(|e| JenkinsError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(JenkinsError::InvalidUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme {}", other),
        }),
    }
}

fn with_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// `{resource}/{segment}/`
fn child(resource: &str, segment: &str) -> String {
    format!("{}{}/", with_slash(resource), segment)
}

/// `{resource}/api/json`
fn api_url(resource: &str) -> String {
    format!("{}api/json", with_slash(resource))
}
