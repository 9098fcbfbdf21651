//! Error types for ordering domain validation and parsing.

use thiserror::Error;

/// Errors returned while computing a reorder plan.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderingError {
    /// The requested target position lies outside the valid insertion range.
    #[error("invalid target position {requested}, container permits 0..={max}")]
    InvalidPosition {
        /// Position the caller asked for.
        requested: u32,
        /// Largest position the container currently permits.
        max: u32,
    },
}

/// Error returned while parsing board roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown board role: {0}")]
pub struct ParseBoardRoleError(pub String);
