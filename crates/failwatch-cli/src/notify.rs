//! Slack incoming-webhook delivery.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_USERNAME: &str = "jenkins_consecutive_fail_detector";
pub const ICON_EMOJI: &str = ":warning:";

/// Where and as whom alerts are posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackConfig {
    pub webhook_url: String,
    pub username: Option<String>,
    pub channel: Option<String>,
}

/// Incoming-webhook message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackPayload {
    pub text: String,
    pub username: String,
    pub icon_emoji: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

pub struct SlackNotifier {
    config: SlackConfig,
    http: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(config: SlackConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("failwatch/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(SlackNotifier { config, http })
    }

    pub fn payload(&self, text: &str) -> SlackPayload {
        SlackPayload {
            text: text.to_string(),
            username: self
                .config
                .username
                .clone()
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            icon_emoji: ICON_EMOJI.to_string(),
            channel: self.config.channel.clone(),
        }
    }

    /// Post `text` once. No retry.
    pub async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let payload = self.payload(text);
        debug!(channel = ?payload.channel, "posting webhook");

        let resp = self
            .http
            .post(&self.config.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
