//! Core types, errors, and timezone handling for hydrostat
//!
//! This crate provides the foundational types shared by the bucketing,
//! statistics, and reporting layers: validated log records, bucket keys,
//! aggregation results, the error type, and timezone configuration.

pub mod aggregation_types;
pub mod error;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{HydrostatError, Result};
pub use types::{BucketKey, Granularity, ISOTimestamp, LogRecord, RawLogRecord};
