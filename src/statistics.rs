//! Summary statistics over bucket totals
//!
//! [`summarize`] never fails: empty or degenerate input yields zeroed
//! statistics, and every percentage guards its divisor.

use crate::aggregation_types::{Bucket, GoalProgress, PeriodComparison, Statistics};
use crate::error::{HydrostatError, Result};

/// Fewest buckets for which a trend is reported
pub const TREND_MIN_BUCKETS: usize = 4;

/// Count, rounded average, extrema, and trend of the bucket totals
///
/// The trend compares the average of the first half of the buckets with the
/// average of the second half. With an odd count the middle bucket belongs
/// to the second half. Below [`TREND_MIN_BUCKETS`] buckets, or when the first
/// half averages zero, the trend is `0`.
///
/// # Examples
///
/// ```
/// use hydrostat::statistics::summarize;
///
/// let stats = summarize(&[]);
/// assert_eq!(stats.count, 0);
/// assert_eq!(stats.trend_percent, 0.0);
/// ```
pub fn summarize(buckets: &[Bucket]) -> Statistics {
    if buckets.is_empty() {
        return Statistics::default();
    }

    let totals: Vec<f64> = buckets.iter().map(|b| b.total).collect();
    let (min, max) = totals
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| {
            (lo.min(t), hi.max(t))
        });

    Statistics {
        count: totals.len(),
        average: mean(&totals).round(),
        min,
        max,
        trend_percent: trend_percent(&totals),
    }
}

fn trend_percent(totals: &[f64]) -> f64 {
    if totals.len() < TREND_MIN_BUCKETS {
        return 0.0;
    }

    let (first_half, second_half) = totals.split_at(totals.len() / 2);
    percent_change(mean(first_half), mean(second_half))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percent change from `previous` to `current`, rounded to one decimal
///
/// Returns `0` when `previous` is zero or the result is not finite.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }

    let change = (current - previous) / previous * 100.0;
    if change.is_finite() {
        round_to_one_decimal(change)
    } else {
        0.0
    }
}

/// Round half away from zero to one decimal place
pub fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compare the buckets of a period with those of the period before it
pub fn compare_periods(current: &[Bucket], previous: &[Bucket]) -> PeriodComparison {
    let current_total = current.iter().fold(0.0, |acc, b| acc + b.total);
    let previous_total = previous.iter().fold(0.0, |acc, b| acc + b.total);

    PeriodComparison {
        current_total,
        previous_total,
        difference: current_total - previous_total,
        change_percent: percent_change(previous_total, current_total),
        current_average: summarize(current).average,
        previous_average: summarize(previous).average,
    }
}

/// Count the buckets whose total reached `goal`
///
/// # Errors
///
/// Returns `InvalidArgument` if `goal` is not a positive finite number.
pub fn goal_progress(buckets: &[Bucket], goal: f64) -> Result<GoalProgress> {
    if !goal.is_finite() || goal <= 0.0 {
        return Err(HydrostatError::InvalidArgument(format!(
            "goal must be a positive amount, got {goal}"
        )));
    }

    let periods_total = buckets.len();
    let periods_met = buckets.iter().filter(|b| b.total >= goal).count();
    let attainment_percent = if periods_total == 0 {
        0.0
    } else {
        round_to_one_decimal(periods_met as f64 / periods_total as f64 * 100.0)
    };

    Ok(GoalProgress {
        goal,
        periods_met,
        periods_total,
        attainment_percent,
    })
}
