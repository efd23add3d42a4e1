//! Error types for the dispatch layer.

use thiserror::Error;

pub use tower::BoxError;

/// Raised by a filter that cannot evaluate an event.
///
/// Filter errors never leave the filter boundary: [`evaluate`](crate::filter::evaluate)
/// logs them and treats the filter as not passed.
#[derive(Debug, Clone, Error)]
pub enum FilterError {
    /// The event lacks a field the filter needs.
    #[error("event has no '{0}' field")]
    MissingField(&'static str),

    /// The event field has an unexpected shape.
    #[error("invalid '{field}' field: {reason}")]
    InvalidField {
        /// The offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Custom filter error.
    #[error("{0}")]
    Custom(String),
}

impl FilterError {
    /// Creates a custom filter error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for raw filter checks.
pub type FilterResult = Result<bool, FilterError>;
