//! Error model for the core primitives.

use thiserror::Error;

/// Result type used by the core primitives.
pub type CoreResult<T> = Result<T, CoreError>;

/// Failure to construct one of the core value types.
///
/// These are deterministic input errors; storage and dispatch failures live in
/// the crates that perform IO.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A stream name was empty or consisted only of whitespace.
    #[error("invalid stream name: {0:?}")]
    InvalidStreamName(String),

    /// An event identifier could not be parsed.
    #[error("invalid event identifier: {0}")]
    InvalidIdentifier(String),

    /// A raw expected version used a value outside the sentinel range.
    #[error("invalid expected version: {0} (use -2 for any, -1 for no stream, or a version >= 0)")]
    InvalidExpectedVersion(i64),
}

impl CoreError {
    pub fn invalid_stream_name(name: impl Into<String>) -> Self {
        Self::InvalidStreamName(name.into())
    }

    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }
}
