//! Report assembly
//!
//! Ties the bucketing, statistics, and chart layers together into the
//! values the formatters render.

use crate::aggregation::Aggregator;
use crate::aggregation_types::{ComparisonReport, IntakeReport};
use crate::chart::{to_chart_series, to_chart_series_with_placeholder};
use crate::error::Result;
use crate::filters::TimeWindow;
use crate::statistics::{compare_periods, goal_progress};
use crate::timezone::TimezoneConfig;
use crate::types::{Granularity, LogRecord};
use tracing::debug;

/// Options for a single-granularity report
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Per-period intake goal in millilitres
    pub goal: Option<f64>,
    /// Emit `values: [0]` for an empty chart
    pub placeholder: bool,
}

/// Aggregate, summarize, and chart `records`
///
/// # Errors
///
/// Returns `InvalidArgument` when `options.goal` is not a positive amount.
pub fn build_intake_report(
    aggregator: &Aggregator,
    records: &[LogRecord],
    granularity: Granularity,
    options: ReportOptions,
) -> Result<IntakeReport> {
    let result = aggregator.analyze(records, granularity);

    let chart = if options.placeholder {
        to_chart_series_with_placeholder(&result.buckets)
    } else {
        to_chart_series(&result.buckets)
    };

    let goal = options
        .goal
        .map(|goal| goal_progress(&result.buckets, goal))
        .transpose()?;

    Ok(IntakeReport {
        granularity,
        timezone: aggregator.timezone_config().display_name().to_string(),
        result,
        chart,
        goal,
    })
}

/// Compare `window` with the same number of whole periods just before it
pub fn build_comparison_report(
    timezone_config: &TimezoneConfig,
    window: TimeWindow,
    max_buckets: usize,
    records: &[LogRecord],
    granularity: Granularity,
) -> Result<ComparisonReport> {
    let previous_window = window.preceding(granularity, &timezone_config.tz)?;
    debug!(
        "Comparing {} .. {} with {} .. {}",
        window.start, window.end, previous_window.start, previous_window.end
    );

    let analyze = |window: TimeWindow| {
        Aggregator::new(timezone_config.clone())
            .with_window(window)
            .with_max_buckets(max_buckets)
            .analyze(records, granularity)
    };
    let current = analyze(window);
    let previous = analyze(previous_window);
    let comparison = compare_periods(&current.buckets, &previous.buckets);

    Ok(ComparisonReport {
        granularity,
        timezone: timezone_config.display_name().to_string(),
        current,
        previous,
        comparison,
    })
}
