//! Error types for controller transport.

use thiserror::Error;

/// Errors that can occur when talking to the fan controller.
///
/// Every transport failure collapses into this taxonomy. Read paths log
/// and swallow these so stale data keeps rendering; the write path
/// surfaces them as an error status in the read model.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The controller answered with a non-success status code.
    #[error("Controller returned status {0}")]
    Status(u16),

    /// Failed to decode a response body.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for a response.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}
