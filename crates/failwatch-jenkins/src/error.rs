//! Error types for failwatch-jenkins

use failwatch_core::ProviderError;
use thiserror::Error;

/// Errors that can occur talking to a Jenkins server
#[derive(Error, Debug)]
pub enum JenkinsError {
    /// Base URL could not be parsed
    #[error("invalid Jenkins URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Resource does not exist (404)
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Credentials rejected (401/403)
    #[error("unauthorized ({status}) for {url}")]
    Unauthorized { status: u16, url: String },

    /// Any other non-success status
    #[error("Jenkins returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Network or client error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body was not the expected JSON
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl From<reqwest::Error> for JenkinsError {
    fn from(err: reqwest::Error) -> Self {
        JenkinsError::Http(err.to_string())
    }
}

impl From<JenkinsError> for ProviderError {
    fn from(err: JenkinsError) -> Self {
        match err {
            JenkinsError::NotFound { url } => ProviderError::NotFound(url),
            JenkinsError::Unauthorized { status, url } => {
                ProviderError::Unauthorized(format!("{} for {}", status, url))
            }
            JenkinsError::Status { status, url } => ProviderError::Status { status, url },
            JenkinsError::Http(message) => ProviderError::Transport(message),
            e @ (JenkinsError::InvalidUrl { .. } | JenkinsError::Decode { .. }) => {
                ProviderError::Decode(e.to_string())
            }
        }
    }
}
