//! Error types for hydrostat
//!
//! This module defines the error types used throughout the hydrostat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Data-quality problems inside a record set (bad timestamps, negative
//! amounts) are never errors: those records are skipped. The variants here
//! cover the boundary: unreadable input, bad flags, unknown timezones.
//!
//! # Example
//!
//! ```
//! use hydrostat_core::error::{HydrostatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to HydrostatError
//!     let _file = std::fs::read_to_string("nonexistent.json")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for hydrostat operations
#[derive(Error, Debug)]
pub enum HydrostatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Input document could not be read as a record set
    #[error("Parse error in {input}: {error}")]
    Parse {
        /// Where the document came from (file path or "stdin")
        input: String,
        /// The error message
        error: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in hydrostat
///
/// # Example
///
/// ```
/// use hydrostat_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, HydrostatError>;
