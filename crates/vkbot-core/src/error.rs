//! Unified error types for the vkbot core.
//!
//! Dispatch-level errors (like `FilterError`) are defined in vkbot-dispatch.

use thiserror::Error;

// =============================================================================
// Event Errors
// =============================================================================

/// Errors that can occur while decoding an inbound event envelope.
#[derive(Debug, Clone, Error)]
pub enum EventError {
    /// The envelope is not valid JSON.
    #[error("malformed event JSON: {0}")]
    Malformed(String),

    /// The envelope has no `type` field.
    #[error("event envelope has no 'type' field")]
    MissingType,

    /// The envelope is not a JSON object.
    #[error("event envelope must be a JSON object")]
    NotAnObject,
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur in transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request could not be sent.
    #[error("request to {url} failed: {reason}")]
    RequestFailed {
        /// The URL that was requested.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, if it could be read.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Invalid configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),
}

// =============================================================================
// API Errors
// =============================================================================

/// Error type for API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The API answered with an `error` object.
    #[error("VK API error ({code}): {message}")]
    Vk {
        /// `error_code` from the response.
        code: i64,
        /// `error_msg` from the response.
        message: String,
    },
    /// The response was neither a `response` nor an `error` object.
    #[error("unexpected API response shape")]
    UnexpectedResponse,
    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The transport cannot issue API calls.
    #[error("API calls are not supported by this transport")]
    NotSupported,
    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for event decoding.
pub type EventResult<T> = Result<T, EventError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
