//! Error types for failwatch-core

use thiserror::Error;

/// Errors a build history provider can report.
///
/// `NotFound` is not a failure of the provider: it means the requested
/// resource does not exist (for example a job that has never been built).
/// Every other variant is a transport, auth, or server-side problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Requested job or build does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials rejected by the server
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Server answered with an unexpected status code
    #[error("server returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Network-level failure (connect, timeout, TLS)
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("decode error: {0}")]
    Decode(String),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Errors raised while building a job filter.
#[derive(Error, Debug)]
pub enum FilterError {
    /// Exclusion pattern is not a valid regular expression
    #[error("invalid job name pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
