//! Error types for the Anthropic API client

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when calling the Messages API
#[derive(Debug, Error)]
pub enum ClaudeError {
    /// `ANTHROPIC_API_KEY` is not set
    #[error("Missing ANTHROPIC_API_KEY environment variable")]
    MissingApiKey,

    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The request did not complete within the client timeout
    #[error("Request timed out")]
    Timeout,

    /// The body could not be decoded into a `MessagesResponse`
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// 429 from the API
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// 529 from the API
    #[error("API overloaded - retry later")]
    Overloaded,

    /// 401 from the API
    #[error("Unauthorized - invalid API key")]
    Unauthorized,

    /// Any other non-success status
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Body returned by the API
        message: String,
    },
}

impl ClaudeError {
    /// Map a non-success status and its body to an error
    #[must_use]
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 => Self::Unauthorized,
            429 => Self::RateLimited,
            529 => Self::Overloaded,
            code => Self::ApiError {
                status: code,
                message: body,
            },
        }
    }

    /// Whether retrying the same request may succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed(_) | Self::Timeout | Self::RateLimited | Self::Overloaded
        )
    }
}

impl From<reqwest::Error> for ClaudeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
