//! Chart-ready series from buckets
//!
//! An empty bucket list produces an explicitly empty series by default so the
//! rendering layer can show its "no data" state. Chart widgets that cannot
//! draw an empty dataset can ask for the single-zero placeholder instead.

use crate::aggregation_types::{Bucket, ChartSeries};

/// Labels and totals in bucket order
///
/// # Examples
///
/// ```
/// use hydrostat::chart::to_chart_series;
///
/// let series = to_chart_series(&[]);
/// assert!(series.is_empty());
/// assert!(series.values.is_empty());
/// ```
pub fn to_chart_series(buckets: &[Bucket]) -> ChartSeries {
    ChartSeries {
        labels: buckets.iter().map(|b| b.label.clone()).collect(),
        values: buckets.iter().map(|b| b.total).collect(),
    }
}

/// Like [`to_chart_series`], but an empty input yields `values: [0]`
pub fn to_chart_series_with_placeholder(buckets: &[Bucket]) -> ChartSeries {
    let mut series = to_chart_series(buckets);
    if series.values.is_empty() {
        series.values.push(0.0);
    }
    series
}
