//! Error types for visualization data fetching.

use thiserror::Error;

/// Result type for data fetches driven by a visualization controller.
pub type FetchResult<T> = Result<T, FetchError>;

/// Reasons a data source can reject a fetch.
///
/// Cloneable so a failed controller can keep the cause in its state and so a
/// shared in-flight fetch can hand the same error to every waiter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The requested resource does not exist.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// The response could not be turned into a payload.
    #[error("Malformed payload: {what}")]
    Decode { what: String },

    /// The local executor refused to run the fetch.
    #[error("Executor unavailable: {what}")]
    Spawn { what: String },
}

impl FetchError {
    /// Shorthand for a decode failure.
    pub fn decode(what: impl Into<String>) -> Self {
        Self::Decode { what: what.into() }
    }

    /// Shorthand for a transport failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
