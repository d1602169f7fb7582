//! CLI interface for hydrostat
//!
//! This module defines the command-line interface using clap:
//! `hydrostat [flags] <daily|weekly|monthly|compare>`. When the report is
//! omitted it defaults to `daily`.
//!
//! # Example
//!
//! ```bash
//! # Last 7 days from a file, bucketed in Ho Chi Minh City time
//! hydrostat --input water-logs.json --timezone Asia/Ho_Chi_Minh daily
//!
//! # Weekly totals for the first quarter as JSON
//! hydrostat --since 2024-01 --until 2024-03 --json weekly
//!
//! # This month against last month
//! hydrostat --max-buckets 1 compare --granularity month
//!
//! # The last 12 months against the 12 calendar months before them
//! hydrostat compare --granularity month
//! ```

use crate::error::{HydrostatError, Result};
use crate::filters::TimeWindow;
use crate::timezone::{TimezoneConfig, start_of_day};
use crate::types::Granularity;
use chrono::{DateTime, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};

/// Summarize water-intake logs into daily, weekly, and monthly totals
#[derive(Parser, Debug, Clone)]
#[command(name = "hydrostat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Records file, or "-" for stdin
    #[arg(long, short = 'i', default_value = "-", global = true)]
    pub input: String,

    /// Filter by start date (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Filter by end date (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub until: Option<String>,

    /// Timezone for bucketing (e.g. "Asia/Ho_Chi_Minh", "America/New_York", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', env = "HYDROSTAT_TIMEZONE", global = true)]
    pub timezone: Option<String>,

    /// Use UTC for bucketing (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Number of most recent buckets to keep (default 7 days, 4 weeks, or 12 months)
    #[arg(long, short = 'n', env = "HYDROSTAT_MAX_BUCKETS", global = true)]
    pub max_buckets: Option<usize>,

    /// Daily/weekly/monthly target in millilitres; reports how often it was met
    #[arg(long, global = true)]
    pub goal: Option<f64>,

    /// Emit a single zero value when the chart series would be empty
    #[arg(long, global = true)]
    pub placeholder: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Report to produce
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Totals per calendar day
    Daily,

    /// Totals per ISO week (Monday start)
    Weekly,

    /// Totals per calendar month
    Monthly,

    /// Compare the selected periods with the ones just before them
    Compare(CompareArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct CompareArgs {
    /// Period size to compare (day, week, month)
    #[arg(long, short = 'g', default_value = "week")]
    pub granularity: Granularity,
}

impl Command {
    /// Granularity the report is bucketed by
    pub fn granularity(&self) -> Granularity {
        match self {
            Command::Daily => Granularity::Day,
            Command::Weekly => Granularity::Week,
            Command::Monthly => Granularity::Month,
            Command::Compare(args) => args.granularity,
        }
    }
}

impl Cli {
    /// The requested report, `daily` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Daily)
    }

    /// Resolve `--utc` / `--timezone` into a timezone configuration
    pub fn timezone_config(&self) -> Result<TimezoneConfig> {
        TimezoneConfig::from_cli(self.timezone.as_deref(), self.utc)
    }

    /// Bucket cap for `granularity`, honoring `--max-buckets`
    pub fn max_buckets(&self, granularity: Granularity) -> usize {
        self.max_buckets
            .unwrap_or_else(|| granularity.default_max_buckets())
    }

    /// Window selected by `--since` / `--until`, or the trailing default
    pub fn window(
        &self,
        granularity: Granularity,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<TimeWindow> {
        resolve_window(
            self.since.as_deref(),
            self.until.as_deref(),
            granularity,
            self.max_buckets(granularity),
            now,
            tz,
        )
    }
}

/// Build the aggregation window from optional date filters
///
/// - neither filter: the trailing `periods` of `granularity` ending today
/// - only `since`: from `since` to the end of today
/// - only `until`: the trailing `periods` ending on `until`
/// - both: exactly `[since, until]`
pub fn resolve_window(
    since: Option<&str>,
    until: Option<&str>,
    granularity: Granularity,
    periods: usize,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<TimeWindow> {
    let since = since.map(parse_date_filter).transpose()?;
    let until = until.map(parse_until_filter).transpose()?;

    match (since, until) {
        (Some(since), Some(until)) => TimeWindow::from_dates(since, until, tz),
        (Some(since), None) => {
            let today = now.with_timezone(tz).date_naive();
            TimeWindow::from_dates(since, today, tz)
        }
        (None, Some(until)) => {
            TimeWindow::trailing(granularity, periods, start_of_day(until, tz)?, tz)
        }
        (None, None) => TimeWindow::trailing(granularity, periods, now, tz),
    }
}

/// Parse a date filter string into a NaiveDate
///
/// Accepts YYYY-MM-DD or YYYY-MM (meaning the first day of that month).
///
/// # Example
///
/// ```
/// use hydrostat::cli::parse_date_filter;
/// use chrono::Datelike;
///
/// let date = parse_date_filter("2024-01-15").unwrap();
/// assert_eq!(date.day(), 15);
///
/// let date = parse_date_filter("2024-01").unwrap();
/// assert_eq!(date.month(), 1);
/// assert_eq!(date.day(), 1);
/// ```
pub fn parse_date_filter(date_str: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }

    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() == 2 {
        let year = parts[0]
            .parse::<i32>()
            .map_err(|_| HydrostatError::InvalidDate(format!("Invalid year in '{date_str}'")))?;
        let month = parts[1]
            .parse::<u32>()
            .map_err(|_| HydrostatError::InvalidDate(format!("Invalid month in '{date_str}'")))?;

        if !(1..=12).contains(&month) {
            return Err(HydrostatError::InvalidDate(format!(
                "Month must be between 1-12, got {month}"
            )));
        }

        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| HydrostatError::InvalidDate(format!("Invalid date: {date_str}")))
    } else {
        Err(HydrostatError::InvalidDate(format!(
            "Invalid date format '{date_str}', expected YYYY-MM-DD or YYYY-MM"
        )))
    }
}

/// Like [`parse_date_filter`], but YYYY-MM means the last day of that month
pub fn parse_until_filter(date_str: &str) -> Result<NaiveDate> {
    let date = parse_date_filter(date_str)?;
    if NaiveDate::parse_from_str(date_str, "%Y-%m-%d").is_ok() {
        return Ok(date);
    }

    date.checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| HydrostatError::InvalidDate(format!("Invalid date: {date_str}")))
}
