//! Output formatting module for hydrostat
//!
//! This module provides formatters for displaying intake reports in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for chart widgets and other tools
//!
//! # Examples
//!
//! ```
//! use hydrostat::aggregation_types::{AggregationResult, ChartSeries, IntakeReport};
//! use hydrostat::output::get_formatter;
//! use hydrostat::types::Granularity;
//!
//! let report = IntakeReport {
//!     granularity: Granularity::Day,
//!     timezone: "UTC".to_string(),
//!     result: AggregationResult::default(),
//!     chart: ChartSeries::default(),
//!     goal: None,
//! };
//!
//! let json = get_formatter(true).format_report(&report);
//! assert!(json.contains("\"chart\""));
//! ```

use crate::aggregation_types::{
    AggregationResult, Bucket, ComparisonReport, GoalProgress, IntakeReport, Statistics,
};
use crate::statistics::round_to_one_decimal;
use crate::types::Granularity;
use colored::*;
use prettytable::{Cell, Row, Table, format, row};
use serde_json::{Value, json};

/// Trait for output formatters
///
/// Implementations render a finished report; no aggregation happens here.
pub trait OutputFormatter {
    /// Format buckets, statistics, chart series, and goal progress
    fn format_report(&self, report: &IntakeReport) -> String;

    /// Format a current-versus-previous comparison
    fn format_comparison(&self, report: &ComparisonReport) -> String;
}

/// Table formatter for human-readable output
///
/// Amounts are shown in millilitres with thousands separators. Trend and
/// change percentages are colored unless `NO_COLOR` is set.
pub struct TableFormatter {
    colored_output: bool,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new(std::env::var("NO_COLOR").is_err())
    }
}

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new(colored_output: bool) -> Self {
        Self { colored_output }
    }

    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    /// Format an amount with separators, keeping one decimal when present
    fn format_amount(value: f64) -> String {
        let rounded = round_to_one_decimal(value.abs());
        let whole = rounded.trunc() as u64;
        let tenths = ((rounded - rounded.trunc()) * 10.0).round() as u64;
        let sign = if value < 0.0 && rounded != 0.0 { "-" } else { "" };

        if tenths == 0 {
            format!("{sign}{}", Self::format_number(whole))
        } else {
            format!("{sign}{}.{tenths}", Self::format_number(whole))
        }
    }

    /// Signed percentage, green for growth and red for decline
    fn format_percent(&self, percent: f64) -> String {
        let text = if percent > 0.0 {
            format!("+{percent:.1}%")
        } else {
            format!("{percent:.1}%")
        };

        if !self.colored_output {
            return text;
        }
        if percent > 0.0 {
            text.green().to_string()
        } else if percent < 0.0 {
            text.red().to_string()
        } else {
            text
        }
    }

    fn title(granularity: Granularity) -> &'static str {
        match granularity {
            Granularity::Day => "Daily intake",
            Granularity::Week => "Weekly intake",
            Granularity::Month => "Monthly intake",
        }
    }

    fn period_heading(granularity: Granularity) -> &'static str {
        match granularity {
            Granularity::Day => "Date",
            Granularity::Week => "Week",
            Granularity::Month => "Month",
        }
    }

    fn bucket_table(granularity: Granularity, buckets: &[Bucket]) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        table.set_titles(row![
            b -> Self::period_heading(granularity),
            b -> "Label",
            b -> "Records",
            b -> "Total (ml)"
        ]);

        for bucket in buckets {
            table.add_row(row![
                bucket.key,
                bucket.label,
                r -> Self::format_number(bucket.record_count as u64),
                r -> Self::format_amount(bucket.total)
            ]);
        }

        // Add separator
        table.add_row(Row::new(vec![Cell::new(""); 4]));

        let record_count: usize = buckets.iter().map(|b| b.record_count).sum();
        let total = buckets.iter().fold(0.0, |acc, b| acc + b.total);
        table.add_row(row![
            b -> "TOTAL",
            "",
            b -> Self::format_number(record_count as u64),
            b -> Self::format_amount(total)
        ]);

        table
    }

    fn format_statistics(&self, stats: &Statistics) -> String {
        format!(
            "Average: {} ml  Min: {} ml  Max: {} ml  Trend: {}\n",
            Self::format_amount(stats.average),
            Self::format_amount(stats.min),
            Self::format_amount(stats.max),
            self.format_percent(stats.trend_percent)
        )
    }

    fn format_goal(goal: &GoalProgress) -> String {
        format!(
            "Goal {} ml: met in {} of {} periods ({:.1}%)\n",
            Self::format_amount(goal.goal),
            goal.periods_met,
            goal.periods_total,
            goal.attainment_percent
        )
    }
}

impl OutputFormatter for TableFormatter {
    fn format_report(&self, report: &IntakeReport) -> String {
        let mut output = format!(
            "{} ({})\n",
            Self::title(report.granularity),
            report.timezone
        );

        if report.result.buckets.is_empty() {
            output.push_str("No intake recorded in this period\n");
            return output;
        }

        output.push_str(&Self::bucket_table(report.granularity, &report.result.buckets).to_string());
        output.push('\n');
        output.push_str(&self.format_statistics(&report.result.statistics));

        if let Some(goal) = &report.goal {
            output.push_str(&Self::format_goal(goal));
        }

        output
    }

    fn format_comparison(&self, report: &ComparisonReport) -> String {
        let mut output = format!(
            "{} compared with the previous period ({})\n",
            Self::title(report.granularity),
            report.timezone
        );

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Period",
            b -> "Range",
            b -> "Buckets",
            b -> "Total (ml)",
            b -> "Average (ml)"
        ]);

        for (name, result) in [("Current", &report.current), ("Previous", &report.previous)] {
            table.add_row(row![
                name,
                Self::range_label(result),
                r -> Self::format_number(result.buckets.len() as u64),
                r -> Self::format_amount(result.total()),
                r -> Self::format_amount(result.statistics.average)
            ]);
        }

        output.push_str(&table.to_string());
        output.push('\n');

        let comparison = &report.comparison;
        let difference = if comparison.difference > 0.0 {
            format!("+{}", Self::format_amount(comparison.difference))
        } else {
            Self::format_amount(comparison.difference)
        };
        output.push_str(&format!(
            "Change: {} ml ({})\n",
            difference,
            self.format_percent(comparison.change_percent)
        ));

        output
    }
}

impl TableFormatter {
    fn range_label(result: &AggregationResult) -> String {
        match (result.buckets.first(), result.buckets.last()) {
            (Some(first), Some(last)) if first.key == last.key => first.label.clone(),
            (Some(first), Some(last)) => format!("{} - {}", first.label, last.label),
            _ => "-".to_string(),
        }
    }
}

/// JSON formatter for machine-readable output
///
/// The `chart` object is exactly what a chart widget consumes: parallel
/// `labels` and `values` arrays in period order.
pub struct JsonFormatter;

impl JsonFormatter {
    fn result_json(result: &AggregationResult) -> Value {
        json!({
            "buckets": result.buckets.iter().map(|b| json!({
                "key": b.key.to_string(),
                "label": b.label,
                "total": b.total,
                "record_count": b.record_count,
            })).collect::<Vec<_>>(),
            "statistics": {
                "count": result.statistics.count,
                "average": result.statistics.average,
                "min": result.statistics.min,
                "max": result.statistics.max,
                "trend_percent": result.statistics.trend_percent,
            },
            "total": result.total(),
            "record_count": result.record_count(),
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &IntakeReport) -> String {
        let mut output = Self::result_json(&report.result);
        output["granularity"] = json!(report.granularity);
        output["timezone"] = json!(report.timezone);
        output["chart"] = json!({
            "labels": report.chart.labels,
            "values": report.chart.values,
        });

        if let Some(goal) = &report.goal {
            output["goal"] = json!({
                "goal": goal.goal,
                "periods_met": goal.periods_met,
                "periods_total": goal.periods_total,
                "attainment_percent": goal.attainment_percent,
            });
        }

        serde_json::to_string_pretty(&output).unwrap_or_default()
    }

    fn format_comparison(&self, report: &ComparisonReport) -> String {
        let comparison = &report.comparison;
        let output = json!({
            "granularity": report.granularity,
            "timezone": report.timezone,
            "current": Self::result_json(&report.current),
            "previous": Self::result_json(&report.previous),
            "comparison": {
                "current_total": comparison.current_total,
                "previous_total": comparison.previous_total,
                "difference": comparison.difference,
                "change_percent": comparison.change_percent,
                "current_average": comparison.current_average,
                "previous_average": comparison.previous_average,
            },
        });

        serde_json::to_string_pretty(&output).unwrap_or_default()
    }
}

/// Get appropriate formatter based on JSON flag
///
/// # Examples
///
/// ```
/// use hydrostat::output::get_formatter;
///
/// // Human-readable tables
/// let formatter = get_formatter(false);
///
/// // Machine-readable JSON
/// let json_formatter = get_formatter(true);
/// ```
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation_types::{ChartSeries, PeriodComparison};
    use crate::chart::to_chart_series;
    use crate::statistics::summarize;
    use crate::types::BucketKey;
    use chrono::NaiveDate;

    fn day_bucket(day: u32, total: f64, record_count: usize) -> Bucket {
        Bucket {
            total,
            record_count,
            ..Bucket::empty(BucketKey::Day(
                NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            ))
        }
    }

    fn sample_report(goal: Option<GoalProgress>) -> IntakeReport {
        let buckets = vec![
            day_bucket(1, 2000.0, 4),
            day_bucket(2, 1500.0, 3),
            day_bucket(3, 1800.0, 3),
            day_bucket(4, 2200.0, 5),
        ];
        IntakeReport {
            granularity: Granularity::Day,
            timezone: "Asia/Ho_Chi_Minh".to_string(),
            chart: to_chart_series(&buckets),
            result: AggregationResult {
                statistics: summarize(&buckets),
                buckets,
            },
            goal,
        }
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(TableFormatter::format_number(1234567), "1,234,567");
        assert_eq!(TableFormatter::format_number(999), "999");
        assert_eq!(TableFormatter::format_number(0), "0");
        assert_eq!(TableFormatter::format_number(1000000000), "1,000,000,000");
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(TableFormatter::format_amount(1875.0), "1,875");
        assert_eq!(TableFormatter::format_amount(250.5), "250.5");
        assert_eq!(TableFormatter::format_amount(12345.04), "12,345");
        assert_eq!(TableFormatter::format_amount(-1500.0), "-1,500");
        assert_eq!(TableFormatter::format_amount(0.0), "0");
    }

    #[test]
    fn test_percent_formatting_without_color() {
        let formatter = TableFormatter::new(false);
        assert_eq!(formatter.format_percent(14.3), "+14.3%");
        assert_eq!(formatter.format_percent(-50.0), "-50.0%");
        assert_eq!(formatter.format_percent(0.0), "0.0%");
    }

    #[test]
    fn test_table_report() {
        let output = TableFormatter::new(false).format_report(&sample_report(None));

        assert!(output.contains("Daily intake (Asia/Ho_Chi_Minh)"));
        assert!(output.contains("2024-03-01"));
        assert!(output.contains("Mar 4"));
        assert!(output.contains("7,500"));
        assert!(output.contains("TOTAL"));
        assert!(output.contains("Average: 1,875 ml"));
        assert!(output.contains("Trend: +14.3%"));
        assert!(!output.contains("Goal"));
    }

    #[test]
    fn test_table_report_with_goal() {
        let goal = GoalProgress {
            goal: 2000.0,
            periods_met: 2,
            periods_total: 4,
            attainment_percent: 50.0,
        };
        let output = TableFormatter::new(false).format_report(&sample_report(Some(goal)));
        assert!(output.contains("Goal 2,000 ml: met in 2 of 4 periods (50.0%)"));
    }

    #[test]
    fn test_table_report_empty() {
        let report = IntakeReport {
            granularity: Granularity::Week,
            timezone: "UTC".to_string(),
            result: AggregationResult::default(),
            chart: ChartSeries::default(),
            goal: None,
        };
        let output = TableFormatter::new(false).format_report(&report);
        assert!(output.contains("Weekly intake (UTC)"));
        assert!(output.contains("No intake recorded"));
        assert!(!output.contains("TOTAL"));
    }

    #[test]
    fn test_table_comparison() {
        let current = vec![day_bucket(8, 2000.0, 2), day_bucket(9, 2500.0, 2)];
        let previous = vec![day_bucket(1, 1500.0, 1), day_bucket(2, 1500.0, 1)];
        let report = ComparisonReport {
            granularity: Granularity::Day,
            timezone: "UTC".to_string(),
            comparison: crate::statistics::compare_periods(&current, &previous),
            current: AggregationResult {
                statistics: summarize(&current),
                buckets: current,
            },
            previous: AggregationResult {
                statistics: summarize(&previous),
                buckets: previous,
            },
        };

        let output = TableFormatter::new(false).format_comparison(&report);
        assert!(output.contains("Current"));
        assert!(output.contains("Mar 8 - Mar 9"));
        assert!(output.contains("4,500"));
        assert!(output.contains("Change: +1,500 ml (+50.0%)"));
    }

    #[test]
    fn test_json_report() {
        let output = JsonFormatter.format_report(&sample_report(None));
        let json: serde_json::Value =
            serde_json::from_str(&output).expect("Failed to parse JSON output");

        assert_eq!(json["granularity"], "day");
        assert_eq!(json["timezone"], "Asia/Ho_Chi_Minh");
        assert_eq!(json["buckets"][0]["key"], "2024-03-01");
        assert_eq!(json["buckets"][3]["record_count"], 5);
        assert_eq!(json["statistics"]["average"], 1875.0);
        assert_eq!(json["statistics"]["trend_percent"], 14.3);
        assert_eq!(json["chart"]["labels"][1], "Mar 2");
        assert_eq!(json["chart"]["values"][3], 2200.0);
        assert_eq!(json["total"], 7500.0);
        assert!(json.get("goal").is_none());
    }

    #[test]
    fn test_json_empty_chart_is_explicit() {
        let report = IntakeReport {
            granularity: Granularity::Month,
            timezone: "UTC".to_string(),
            result: AggregationResult::default(),
            chart: ChartSeries::default(),
            goal: None,
        };
        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_report(&report)).unwrap();
        assert_eq!(json["chart"]["labels"], serde_json::json!([]));
        assert_eq!(json["chart"]["values"], serde_json::json!([]));
        assert_eq!(json["statistics"]["count"], 0);
    }

    #[test]
    fn test_json_empty_report_total_is_positive_zero() {
        let aggregator = crate::aggregation::Aggregator::new(crate::timezone::TimezoneConfig::utc());
        let report = crate::report::build_intake_report(
            &aggregator,
            &[],
            Granularity::Day,
            crate::report::ReportOptions::default(),
        )
        .unwrap();

        let output = JsonFormatter.format_report(&report);
        assert!(!output.contains("-0.0"));

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        let total = json["total"].as_f64().unwrap();
        assert_eq!(total, 0.0);
        assert!(total.is_sign_positive());
    }

    #[test]
    fn test_json_comparison() {
        let report = ComparisonReport {
            granularity: Granularity::Week,
            timezone: "UTC".to_string(),
            current: AggregationResult::default(),
            previous: AggregationResult::default(),
            comparison: PeriodComparison {
                current_total: 1000.0,
                ..PeriodComparison::default()
            },
        };
        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_comparison(&report)).unwrap();
        assert_eq!(json["granularity"], "week");
        assert_eq!(json["comparison"]["current_total"], 1000.0);
        assert_eq!(json["comparison"]["change_percent"], 0.0);
    }

    #[test]
    fn test_get_formatter() {
        let report = sample_report(None);
        assert!(get_formatter(true).format_report(&report).contains("\"buckets\""));
        assert!(get_formatter(false).format_report(&report).contains("TOTAL"));
    }
}
