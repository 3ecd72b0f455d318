//! Shared Error Types

use thiserror::Error;

/// Errors raised while talking to a managed collaborator (prediction or monitoring)
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// No response within the fixed timeout
    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    /// The service rejected the call because of rate limiting
    #[error("Upstream throttled the request: {0}")]
    Throttled(String),

    /// Non-success HTTP status
    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection-level failure
    #[error("Upstream transport error: {0}")]
    Transport(String),

    /// Response arrived but could not be understood
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}

impl UpstreamError {
    /// Whether an automatic retry may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Timeout(_)
            | UpstreamError::Throttled(_)
            | UpstreamError::Transport(_) => true,
            UpstreamError::Status { status, .. } => *status >= 500,
            UpstreamError::Malformed(_) => false,
        }
    }
}

/// Fatal startup errors: missing or invalid process configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Required identifier absent or empty
    #[error("Missing required configuration value: {0}")]
    Missing(&'static str),

    /// Value present but unusable
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// Configuration source could not be read or deserialized
    #[error("Configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    /// Global subscriber already installed or unusable
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
