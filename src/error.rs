//! Error types for graccstat
//!
//! This module defines the error types used throughout the graccstat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! The variants fall into three groups: query failures (`Query`, `Network`,
//! `Json`, `MalformedResponse`) raised while talking to the aggregation
//! backend, the `SanityCheck` failure raised when an assembled report sums to
//! zero everywhere, and `Alignment`, a programming-error assertion for window
//! arithmetic that should never fire at runtime.

use thiserror::Error;

/// Main error type for graccstat operations
#[derive(Error, Debug)]
pub enum GraccstatError {
    /// Backend answered with a non-success status
    #[error("backend query failed with status {status}")]
    Query {
        /// HTTP status returned by the backend
        status: reqwest::StatusCode,
    },

    /// Network-level failure talking to the backend
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend response parsed as JSON but is missing expected structure
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    /// Assembled reports summed to zero across every window
    #[error("generated reports are empty: all sums are zero across every window")]
    SanityCheck,

    /// Window arithmetic produced an impossible result
    #[error("window alignment violated: {0}")]
    Alignment(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in graccstat
pub type Result<T> = std::result::Result<T, GraccstatError>;
