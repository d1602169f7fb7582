//! Aggregation module for bucketing intake records
//!
//! This module groups validated [`LogRecord`]s into day, ISO-week, or month
//! buckets in a configured timezone. Buckets come back sorted by period and
//! trimmed to the most recent ones, ready for [`crate::statistics`] and
//! [`crate::chart`].
//!
//! Aggregation is a pure function of its inputs: calling it twice with the
//! same records yields the same buckets, and nothing is cached between calls.
//!
//! # Examples
//!
//! ```
//! use hydrostat::{
//!     aggregation::Aggregator,
//!     filters::TimeWindow,
//!     timezone::TimezoneConfig,
//!     types::{Granularity, ISOTimestamp, LogRecord},
//! };
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! let tz = TimezoneConfig::utc();
//! let window = TimeWindow::from_dates(
//!     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
//!     &tz.tz,
//! )
//! .unwrap();
//!
//! let records = vec![
//!     LogRecord::new(ISOTimestamp::new(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()), 500.0),
//!     LogRecord::new(ISOTimestamp::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()), 750.0),
//! ];
//!
//! let aggregator = Aggregator::new(tz).with_window(window).with_max_buckets(7);
//! let buckets = aggregator.aggregate(&records, Granularity::Day);
//! assert_eq!(buckets.len(), 1);
//! assert_eq!(buckets[0].total, 1250.0);
//! ```

use crate::aggregation_types::{AggregationResult, Bucket};
use crate::filters::TimeWindow;
use crate::statistics::summarize;
use crate::timezone::TimezoneConfig;
use crate::types::{BucketKey, Granularity, LogRecord};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;
use tracing::debug;

/// Accumulator for one period
#[derive(Default)]
struct BucketAccumulator {
    total: f64,
    record_count: usize,
}

impl BucketAccumulator {
    fn add_record(&mut self, record: &LogRecord) {
        self.total += record.amount;
        self.record_count += 1;
    }

    fn into_bucket(self, key: BucketKey) -> Bucket {
        Bucket {
            label: key.label(),
            key,
            total: self.total,
            record_count: self.record_count,
        }
    }
}

/// Main aggregation engine
///
/// Holds the timezone, an optional window, and an optional bucket cap.
/// Without a window every record is eligible; without a cap every bucket
/// is returned.
#[derive(Debug, Clone)]
pub struct Aggregator {
    timezone_config: TimezoneConfig,
    window: Option<TimeWindow>,
    max_buckets: Option<usize>,
}

impl Aggregator {
    /// Create a new Aggregator
    pub fn new(timezone_config: TimezoneConfig) -> Self {
        Self {
            timezone_config,
            window: None,
            max_buckets: None,
        }
    }

    /// Only aggregate records inside `window`
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Keep at most `max_buckets` of the most recent buckets
    pub fn with_max_buckets(mut self, max_buckets: usize) -> Self {
        self.max_buckets = Some(max_buckets);
        self
    }

    /// Get the timezone configuration
    pub fn timezone_config(&self) -> &TimezoneConfig {
        &self.timezone_config
    }

    /// Group records into buckets of `granularity`
    ///
    /// Records outside the window or with an invalid amount are skipped.
    /// The result is ascending by period start and holds at most
    /// `max_buckets` entries, dropping the oldest first.
    pub fn aggregate(&self, records: &[LogRecord], granularity: Granularity) -> Vec<Bucket> {
        let tz = &self.timezone_config.tz;
        let mut bucket_map: BTreeMap<BucketKey, BucketAccumulator> = BTreeMap::new();
        let mut outside_window = 0usize;
        let mut invalid = 0usize;

        for record in records {
            if !record.has_valid_amount() {
                invalid += 1;
                continue;
            }
            if let Some(window) = &self.window
                && !window.matches(record)
            {
                outside_window += 1;
                continue;
            }

            bucket_map
                .entry(record.bucket_key(granularity, tz))
                .or_default()
                .add_record(record);
        }

        if invalid > 0 || outside_window > 0 {
            debug!(
                "Skipped {} records with invalid amounts and {} outside the window",
                invalid, outside_window
            );
        }

        // BTreeMap iteration is already chronological for a single granularity
        let mut buckets: Vec<Bucket> = bucket_map
            .into_iter()
            .map(|(key, acc)| acc.into_bucket(key))
            .collect();

        if let Some(max_buckets) = self.max_buckets {
            trim_to_recent(&mut buckets, max_buckets);
        }

        debug!(
            "Aggregated {} records into {} {} buckets ({})",
            records.len(),
            buckets.len(),
            granularity,
            self.timezone_config.display_name()
        );
        buckets
    }

    /// Aggregate by calendar day
    pub fn aggregate_daily(&self, records: &[LogRecord]) -> Vec<Bucket> {
        self.aggregate(records, Granularity::Day)
    }

    /// Aggregate by ISO week
    pub fn aggregate_weekly(&self, records: &[LogRecord]) -> Vec<Bucket> {
        self.aggregate(records, Granularity::Week)
    }

    /// Aggregate by calendar month
    pub fn aggregate_monthly(&self, records: &[LogRecord]) -> Vec<Bucket> {
        self.aggregate(records, Granularity::Month)
    }

    /// Aggregate and summarize in one step
    pub fn analyze(&self, records: &[LogRecord], granularity: Granularity) -> AggregationResult {
        let buckets = self.aggregate(records, granularity);
        let statistics = summarize(&buckets);
        AggregationResult {
            buckets,
            statistics,
        }
    }
}

/// Bucket `records` inside `[window_start, window_end]` by `granularity` in `tz`
///
/// Free-function form of [`Aggregator::aggregate`]. An inverted window
/// contains nothing and yields no buckets.
pub fn aggregate(
    records: &[LogRecord],
    granularity: Granularity,
    tz: Tz,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    max_buckets: usize,
) -> Vec<Bucket> {
    let window = TimeWindow {
        start: window_start,
        end: window_end,
    };
    Aggregator::new(TimezoneConfig::new(tz))
        .with_window(window)
        .with_max_buckets(max_buckets)
        .aggregate(records, granularity)
}

/// Drop the oldest buckets so at most `max_buckets` remain
fn trim_to_recent(buckets: &mut Vec<Bucket>, max_buckets: usize) {
    if buckets.len() > max_buckets {
        let excess = buckets.len() - max_buckets;
        buckets.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ISOTimestamp;
    use chrono::{NaiveDate, TimeZone};

    fn record(y: i32, m: u32, d: u32, h: u32, amount: f64) -> LogRecord {
        LogRecord::new(
            ISOTimestamp::new(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()),
            amount,
        )
    }

    fn keys(buckets: &[Bucket]) -> Vec<String> {
        buckets.iter().map(|b| b.key.to_string()).collect()
    }

    #[test]
    fn test_bucket_accumulator() {
        let mut acc = BucketAccumulator::default();
        acc.add_record(&record(2024, 3, 1, 8, 250.0));
        acc.add_record(&record(2024, 3, 1, 9, 500.0));
        assert_eq!(acc.total, 750.0);
        assert_eq!(acc.record_count, 2);

        let key = BucketKey::Day(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let bucket = acc.into_bucket(key);
        assert_eq!(bucket.label, "Mar 1");
        assert_eq!(bucket.total, 750.0);
    }

    #[test]
    fn test_empty_records() {
        let aggregator = Aggregator::new(TimezoneConfig::utc());
        assert!(aggregator.aggregate_daily(&[]).is_empty());

        let result = aggregator.analyze(&[], Granularity::Week);
        assert!(result.buckets.is_empty());
        assert_eq!(result.statistics.count, 0);
    }

    #[test]
    fn test_daily_groups_and_sorts() {
        let records = vec![
            record(2024, 3, 3, 8, 1800.0),
            record(2024, 3, 1, 8, 1000.0),
            record(2024, 3, 2, 8, 1500.0),
            record(2024, 3, 1, 20, 1000.0),
        ];

        let buckets = Aggregator::new(TimezoneConfig::utc()).aggregate_daily(&records);
        assert_eq!(keys(&buckets), ["2024-03-01", "2024-03-02", "2024-03-03"]);
        assert_eq!(buckets[0].total, 2000.0);
        assert_eq!(buckets[0].record_count, 2);
        assert_eq!(buckets[2].label, "Mar 3");
    }

    #[test]
    fn test_weekly_orders_by_week_number() {
        let records = vec![
            record(2024, 3, 4, 8, 100.0),  // W10
            record(2024, 1, 8, 8, 200.0),  // W02
            record(2023, 12, 31, 8, 50.0), // 2023-W52
        ];

        let buckets = Aggregator::new(TimezoneConfig::utc()).aggregate_weekly(&records);
        assert_eq!(keys(&buckets), ["2023-W52", "2024-W02", "2024-W10"]);
        assert_eq!(buckets[1].label, "W2");
    }

    #[test]
    fn test_weekly_iso_year_boundary() {
        // Dec 30 2024 and Jan 2 2025 share ISO week 2025-W01
        let records = vec![record(2024, 12, 30, 8, 300.0), record(2025, 1, 2, 8, 700.0)];

        let buckets = Aggregator::new(TimezoneConfig::utc()).aggregate_weekly(&records);
        assert_eq!(keys(&buckets), ["2025-W01"]);
        assert_eq!(buckets[0].total, 1000.0);
    }

    #[test]
    fn test_monthly_orders_by_month_number() {
        let records = vec![
            record(2024, 10, 5, 8, 100.0),
            record(2024, 2, 5, 8, 200.0),
            record(2023, 11, 5, 8, 300.0),
        ];

        let buckets = Aggregator::new(TimezoneConfig::utc()).aggregate_monthly(&records);
        assert_eq!(keys(&buckets), ["2023-11", "2024-02", "2024-10"]);
        assert_eq!(buckets[1].label, "Feb 24");
    }

    #[test]
    fn test_timezone_shifts_day() {
        let records = vec![record(2024, 1, 1, 23, 500.0)];

        let utc = Aggregator::new(TimezoneConfig::utc()).aggregate_daily(&records);
        assert_eq!(keys(&utc), ["2024-01-01"]);

        let hcm = Aggregator::new(TimezoneConfig::new(chrono_tz::Asia::Ho_Chi_Minh))
            .aggregate_daily(&records);
        assert_eq!(keys(&hcm), ["2024-01-02"]);
    }

    #[test]
    fn test_window_excludes_records() {
        let window = TimeWindow::from_dates(
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            &Tz::UTC,
        )
        .unwrap();
        let records = vec![
            record(2024, 3, 1, 8, 1000.0),
            record(2024, 3, 2, 8, 1500.0),
            record(2024, 3, 3, 8, 1800.0),
            record(2024, 3, 4, 8, 2200.0),
        ];

        let buckets = Aggregator::new(TimezoneConfig::utc())
            .with_window(window)
            .aggregate_daily(&records);
        assert_eq!(keys(&buckets), ["2024-03-02", "2024-03-03"]);
    }

    #[test]
    fn test_invalid_amounts_are_skipped() {
        let records = vec![
            record(2024, 3, 1, 8, 1000.0),
            record(2024, 3, 1, 9, -200.0),
            record(2024, 3, 1, 10, f64::NAN),
        ];

        let buckets = Aggregator::new(TimezoneConfig::utc()).aggregate_daily(&records);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].total, 1000.0);
        assert_eq!(buckets[0].record_count, 1);
    }

    #[test]
    fn test_trim_keeps_most_recent() {
        let records: Vec<_> = (1..=10).map(|d| record(2024, 3, d, 8, d as f64)).collect();

        let buckets = Aggregator::new(TimezoneConfig::utc())
            .with_max_buckets(3)
            .aggregate_daily(&records);
        assert_eq!(keys(&buckets), ["2024-03-08", "2024-03-09", "2024-03-10"]);
    }

    #[test]
    fn test_trim_zero_max_buckets() {
        let records = vec![record(2024, 3, 1, 8, 1000.0)];
        let buckets = Aggregator::new(TimezoneConfig::utc())
            .with_max_buckets(0)
            .aggregate_daily(&records);
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_free_function_inverted_window() {
        let records = vec![record(2024, 3, 1, 8, 1000.0)];
        let start = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        assert!(aggregate(&records, Granularity::Day, Tz::UTC, start, end, 10).is_empty());
    }

    #[test]
    fn test_analyze_attaches_statistics() {
        let records = vec![record(2024, 3, 1, 8, 1000.0), record(2024, 3, 2, 8, 3000.0)];
        let result = Aggregator::new(TimezoneConfig::utc()).analyze(&records, Granularity::Day);

        assert_eq!(result.statistics.count, 2);
        assert_eq!(result.statistics.average, 2000.0);
        assert_eq!(result.statistics.min, 1000.0);
        assert_eq!(result.statistics.max, 3000.0);
    }
}
