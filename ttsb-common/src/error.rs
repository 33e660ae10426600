//! Common error types for TTSB

use thiserror::Error;

/// Common result type for TTSB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the TTSB crates
///
/// Only I/O-boundary failures live here. A frame that fits no scoreboard
/// layout or a name that matches no roster entry is an `Option::None`, not
/// an error.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited file could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Frame dump or report (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input structure
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
