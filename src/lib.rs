//! hydrostat - Summarize water-intake logs into time-bucketed totals
//!
//! This library provides functionality to:
//! - Load intake records from the log-fetch service's JSON (file or stdin)
//! - Group records into day, ISO-week, or month buckets in any IANA timezone
//! - Compute average, extrema, trend, period comparisons, and goal attainment
//! - Produce chart-ready label/value series
//! - Generate reports in table and JSON formats
//!
//! # Examples
//!
//! ```no_run
//! use hydrostat::{
//!     aggregation::Aggregator,
//!     data_loader::DataLoader,
//!     filters::TimeWindow,
//!     report::{ReportOptions, build_intake_report},
//!     timezone::TimezoneConfig,
//!     types::Granularity,
//! };
//!
//! #[tokio::main]
//! async fn main() -> hydrostat::Result<()> {
//!     let tz = TimezoneConfig::new(chrono_tz::Asia::Ho_Chi_Minh);
//!     let loaded = DataLoader::from_path("water-logs.json", tz.tz).load().await?;
//!
//!     let window = TimeWindow::trailing(Granularity::Day, 7, chrono::Utc::now(), &tz.tz)?;
//!     let aggregator = Aggregator::new(tz).with_window(window).with_max_buckets(7);
//!     let report = build_intake_report(
//!         &aggregator,
//!         &loaded.records,
//!         Granularity::Day,
//!         ReportOptions::default(),
//!     )?;
//!
//!     println!("{:?}", report.chart);
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod chart;
pub mod cli;
pub mod data_loader;
pub mod filters;
pub mod output;
pub mod report;
pub mod statistics;

pub use hydrostat_core::{aggregation_types, error, timezone, types};

// Re-export commonly used types
pub use error::{HydrostatError, Result};
pub use types::{BucketKey, Granularity, ISOTimestamp, LogRecord, RawLogRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
