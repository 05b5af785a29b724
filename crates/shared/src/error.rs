use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Conflict,
    RateLimited,
    Internal,
}

/// Error body returned by the feed API. Doubles as a typed error so gateway
/// callers can match on `code` without string inspection.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("feed api error {code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Transient failures a remote collaborator may choose to retry. The
    /// action controller itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(self.code, ErrorCode::RateLimited | ErrorCode::Internal)
    }
}
