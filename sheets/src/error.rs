//! Sheets error types

use reqwest::StatusCode;
use thiserror::Error;
use ticket_assist_core::store::StoreError;

/// Errors from the Sheets API or its authentication
#[derive(Error, Debug)]
pub enum SheetsError {
    /// Keyfile missing or unreadable
    #[error("Failed to load credentials: {0}")]
    Credentials(String),

    /// Signing the service-account assertion failed
    #[error("Failed to sign token assertion: {0}")]
    Signing(String),

    /// The token endpoint rejected the assertion
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// Network failure
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Bearer token rejected (401/403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status
    #[error("Sheets API error ({status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Failed to parse response: {0}")]
    ResponseParseFailed(String),
}

impl SheetsError {
    /// Classify a non-success response
    #[must_use]
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(body),
            _ => Self::ApiError {
                status: status.as_u16(),
                message: body,
            },
        }
    }
}

impl From<reqwest::Error> for SheetsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

impl From<SheetsError> for StoreError {
    fn from(err: SheetsError) -> Self {
        match err {
            SheetsError::Credentials(_)
            | SheetsError::Signing(_)
            | SheetsError::TokenExchange(_)
            | SheetsError::Unauthorized(_) => Self::Auth(err.to_string()),
            SheetsError::ResponseParseFailed(_) => Self::Malformed(err.to_string()),
            SheetsError::RequestFailed(_) | SheetsError::Timeout | SheetsError::ApiError { .. } => {
                Self::Transport(err.to_string())
            }
        }
    }
}
