//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for parsing and validating the shared types.
#[derive(Debug, Error, PartialEq)]
pub enum UnswachhError {
    #[error("invalid coordinate: lat {latitude}, lon {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("invalid report id: {0}")]
    InvalidReportId(String),

    #[error("invalid voter id: {0}")]
    InvalidVoterId(String),

    #[error("unknown report status: {0}")]
    InvalidStatus(String),

    #[error("unknown vote choice: {0}")]
    InvalidVoteChoice(String),

    #[error("random source unavailable: {0}")]
    Random(String),
}
