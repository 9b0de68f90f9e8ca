//! Command-line flags, environment variables, and their validation.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use failwatch_core::{FilterError, JobFilter, DEFAULT_STALE_AFTER_MINUTES};
use failwatch_jenkins::{AuthMethod, JenkinsConfig, DEFAULT_PAGE_SIZE};
use thiserror::Error;

use crate::notify::SlackConfig;

/// Legacy spelling of `SLACK_CHANNEL` still honoured when the correct
/// variable is unset.
pub const LEGACY_SLACK_CHANNEL_VAR: &str = "SLACK_CHANNNEL";

#[derive(Parser, Debug)]
#[command(name = "failwatch")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Report Jenkins jobs that are stale-failing or failing repeatedly",
    long_about = "Checks every enabled Jenkins job once. Exits 0 when all jobs are healthy, \
                  1 when any job needs attention, 2 on configuration or roster errors."
)]
pub struct Cli {
    /// Jenkins server URL, e.g. https://example.com:8080/jenkins
    #[arg(long, env = "JENKINS_URL")]
    pub url: Option<String>,

    /// Jenkins user name
    #[arg(long, env = "JENKINS_USER")]
    pub user: Option<String>,

    /// Jenkins API token (takes precedence over the password)
    #[arg(long, env = "JENKINS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Jenkins password
    #[arg(long, env = "JENKINS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Skip jobs whose name matches this regular expression
    #[arg(long, env = "IGNORE_JOB_NAME_PATTERN")]
    pub ignore_job_name_pattern: Option<String>,

    /// Slack incoming webhook URL; alerts are posted only when set
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub slack_webhook_url: Option<String>,

    /// User name the Slack message is posted as
    #[arg(long, env = "SLACK_USERNAME")]
    pub slack_username: Option<String>,

    /// Slack channel override
    #[arg(long, env = "SLACK_CHANNEL")]
    pub slack_channel: Option<String>,

    /// Minutes after which a failed last build counts as stale
    #[arg(long, env = "FAILWATCH_STALE_AFTER_MINUTES", default_value_t = DEFAULT_STALE_AFTER_MINUTES)]
    pub stale_after_minutes: i64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "FAILWATCH_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Jobs fetched per roster request (0 disables paging)
    #[arg(long, env = "FAILWATCH_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Summary output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    pub json_logs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Startup configuration errors. All of them abort before any job is checked.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("jenkins url is required. --url https://example.com:8080/jenkins or JENKINS_URL")]
    MissingUrl,

    #[error("a password requires a user name (JENKINS_USER)")]
    PasswordWithoutUser,

    #[error("an API token requires a user name (JENKINS_USER)")]
    TokenWithoutUser,

    #[error("stale threshold must be a positive number of minutes, got {0}")]
    InvalidStaleThreshold(i64),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Validated settings for one run.
#[derive(Debug)]
pub struct Settings {
    pub jenkins: JenkinsConfig,
    pub filter: JobFilter,
    pub stale_after: chrono::Duration,
    pub slack: Option<SlackConfig>,
    pub format: OutputFormat,
}

impl Settings {
    /// Validate parsed flags. `env` looks up variables clap does not model.
    pub fn resolve(cli: Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = non_empty(cli.url).ok_or(ConfigError::MissingUrl)?;
        let auth = resolve_auth(
            non_empty(cli.user),
            non_empty(cli.token),
            non_empty(cli.password),
        )?;

        let stale_after = stale_threshold(cli.stale_after_minutes)?;

        let filter = JobFilter::from_pattern(cli.ignore_job_name_pattern.as_deref())?;

        let slack = non_empty(cli.slack_webhook_url).map(|webhook_url| SlackConfig {
            webhook_url,
            username: non_empty(cli.slack_username),
            channel: non_empty(cli.slack_channel)
                .or_else(|| non_empty(env(LEGACY_SLACK_CHANNEL_VAR))),
        });

        let jenkins = JenkinsConfig::new(&url, auth)
            .with_timeout(Duration::from_secs(cli.timeout_secs))
            .with_page_size(cli.page_size);

        Ok(Settings {
            jenkins,
            filter,
            stale_after,
            slack,
            format: cli.format,
        })
    }
}

/// Positive and small enough for `chrono::Duration`.
fn stale_threshold(minutes: i64) -> Result<chrono::Duration, ConfigError> {
    if minutes <= 0 {
        return Err(ConfigError::InvalidStaleThreshold(minutes));
    }
    chrono::Duration::try_minutes(minutes).ok_or(ConfigError::InvalidStaleThreshold(minutes))
}

/// Token wins over password; no credentials means anonymous access.
fn resolve_auth(
    user: Option<String>,
    token: Option<String>,
    password: Option<String>,
) -> Result<AuthMethod, ConfigError> {
    match (user, token, password) {
        (Some(user), Some(token), _) => Ok(AuthMethod::Token { user, token }),
        (None, Some(_), _) => Err(ConfigError::TokenWithoutUser),
        (Some(user), None, Some(password)) => Ok(AuthMethod::Basic { user, password }),
        (None, None, Some(_)) => Err(ConfigError::PasswordWithoutUser),
        (_, None, None) => Ok(AuthMethod::Anonymous),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
