//! Error types for generation sessions.

use std::time::Duration;

/// Errors from a generation request or streaming session.
///
/// Malformed NDJSON lines never show up here: they are handled by the
/// session's [`LinePolicy`](crate::LinePolicy) and the stream continues.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    // Retryable errors
    /// Network-level error (connection refused, reset, read failure mid-stream).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Request timed out.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// Generation service is temporarily unavailable (5xx).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    // Terminal errors
    /// Malformed or invalid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Requested model is not installed on the service.
    #[error("model not found: {0}")]
    ModelNotFound(String),
    /// A non-streaming response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The service reported an error record in the middle of a stream.
    #[error("stream error: {0}")]
    Stream(String),
    /// The session was cancelled by the caller.
    #[error("cancelled")]
    Cancelled,
}

impl GenerateError {
    /// Whether this error is likely transient and the request can be retried.
    ///
    /// Nothing in coursekit retries on its own; this is advice for callers.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::ServiceUnavailable(_)
        )
    }
}
