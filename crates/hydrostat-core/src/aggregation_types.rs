//! Aggregation data types for hydrostat
//!
//! Pure data structures produced by the bucketing and statistics engines.
//! They are recomputed from scratch on every call and carry no identity
//! beyond their period key.

use crate::types::{BucketKey, Granularity};
use serde::{Deserialize, Serialize};

/// Total intake for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Canonical period key (`2024-03-15`, `2024-W11`, `2024-03`)
    pub key: BucketKey,
    /// Short display label (`Mar 15`, `W11`, `Mar 24`)
    pub label: String,
    /// Sum of record amounts in the period
    pub total: f64,
    /// Number of records contributing to `total`
    pub record_count: usize,
}

impl Bucket {
    /// Create an empty bucket for `key`
    pub fn empty(key: BucketKey) -> Self {
        Self {
            label: key.label(),
            key,
            total: 0.0,
            record_count: 0,
        }
    }
}

/// Summary statistics over bucket totals
///
/// All fields are zero when there are no buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of buckets
    pub count: usize,
    /// Mean bucket total, rounded to the nearest integer
    pub average: f64,
    /// Smallest bucket total
    pub min: f64,
    /// Largest bucket total
    pub max: f64,
    /// Change from first-half to second-half average, in percent (one decimal)
    pub trend_percent: f64,
}

/// Parallel label/value arrays for a chart widget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    /// True when there is nothing to plot
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Buckets together with their statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Ascending by period, trimmed to the most recent buckets
    pub buckets: Vec<Bucket>,
    pub statistics: Statistics,
}

impl AggregationResult {
    /// Sum of all bucket totals
    pub fn total(&self) -> f64 {
        self.buckets.iter().fold(0.0, |acc, b| acc + b.total)
    }

    /// Number of records across all buckets
    pub fn record_count(&self) -> usize {
        self.buckets.iter().map(|b| b.record_count).sum()
    }
}

/// Current period set measured against the preceding one
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub current_total: f64,
    pub previous_total: f64,
    /// `current_total - previous_total`
    pub difference: f64,
    /// Percent change relative to the previous total (one decimal, 0 if previous is 0)
    pub change_percent: f64,
    pub current_average: f64,
    pub previous_average: f64,
}

/// How many periods reached an intake goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// Target amount per period
    pub goal: f64,
    /// Periods whose total reached the goal
    pub periods_met: usize,
    /// Periods considered
    pub periods_total: usize,
    /// `periods_met / periods_total` in percent (one decimal)
    pub attainment_percent: f64,
}

/// Everything a single-granularity report renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeReport {
    pub granularity: Granularity,
    /// IANA name of the zone buckets were computed in
    pub timezone: String,
    pub result: AggregationResult,
    pub chart: ChartSeries,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub goal: Option<GoalProgress>,
}

/// Everything a comparison report renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub granularity: Granularity,
    pub timezone: String,
    pub current: AggregationResult,
    pub previous: AggregationResult,
    pub comparison: PeriodComparison,
}
