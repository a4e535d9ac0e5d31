//! Error types for HTTP operations.

use thiserror::Error;

/// Boxed error returned by deferred header value sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for HTTP operations.
///
/// Describes what went wrong while building or sending a request. The
/// dispatch layer logs these and never retries.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] BoxError),

    /// Request timed out.
    ///
    /// The server did not respond within the configured timeout period.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    ///
    /// Typically a template that rendered into something that is not a URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The payload could not be serialized.
    #[error("Failed to serialize payload: {0}")]
    Payload(#[source] serde_json::Error),

    /// The HTTP client could not be constructed (proxy, TLS).
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] BoxError),
}

/// Error raised while computing the value of an execution header.
///
/// Aborts the request it belongs to before anything is sent. The header
/// value itself never appears in the message.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// A constant or supplier value source failed.
    #[error("Failed to compute value of header '{key}': {source}")]
    Value {
        /// Header name
        key: String,
        /// Underlying failure
        #[source]
        source: BoxError,
    },

    /// A value source that reads the request content failed.
    #[error("Content transformer for header '{key}' failed: {source}")]
    Content {
        /// Header name
        key: String,
        /// Underlying failure
        #[source]
        source: BoxError,
    },

    /// The computed name or value is not a legal HTTP header.
    #[error("Invalid header '{key}': {reason}")]
    Invalid {
        /// Header name
        key: String,
        /// Reason for invalidity
        reason: String,
    },
}

impl HeaderError {
    /// Returns the name of the header that failed.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Value { key, .. } | Self::Content { key, .. } | Self::Invalid { key, .. } => key,
        }
    }

    /// Returns true if the failing header needed access to the request content.
    #[must_use]
    pub const fn requires_content(&self) -> bool {
        matches!(self, Self::Content { .. })
    }
}
