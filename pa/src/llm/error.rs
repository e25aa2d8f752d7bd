//! LLM error types
//!
//! Every failed request attempt becomes an [`LlmError`] first. The retry loop
//! then asks the error itself whether another attempt can succeed.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited by provider{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("LLM client misconfigured: {0}")]
    Config(String),
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    retry_after
        .map(|d| format!(" (retry after {}s)", d.as_secs()))
        .unwrap_or_default()
}

impl LlmError {
    /// Error for a non-success HTTP status
    pub(crate) fn from_status(status: u16, retry_after: Option<Duration>, body: String) -> Self {
        match status {
            429 => LlmError::RateLimited { retry_after },
            _ => LlmError::ApiError { status, message: body },
        }
    }

    /// Map a transport failure, keeping timeouts distinct from other network errors
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Network(err)
        }
    }

    /// Whether sending the same request again can succeed
    ///
    /// Rate limits, timeouts, request timeouts (408) and server-side statuses
    /// are transient. A request that could not even be built, or was rejected
    /// as a client error, fails the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } | LlmError::Timeout(_) => true,
            LlmError::ApiError { status, .. } => matches!(status, 408 | 500..=599),
            LlmError::Network(e) => !(e.is_builder() || e.is_redirect() || e.is_decode()),
            LlmError::InvalidResponse(_) | LlmError::Json(_) | LlmError::Config(_) => false,
        }
    }

    /// Wait the provider asked for, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}
