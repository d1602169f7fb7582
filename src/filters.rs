//! Time windows for selecting which records are aggregated
//!
//! A [`TimeWindow`] is an inclusive pair of UTC instants. Windows are built
//! from calendar dates in the configured timezone, or from the trailing-range
//! presets of the analytics screen (last 7 days, last 4 weeks, last 12 months).
//!
//! # Examples
//!
//! ```
//! use hydrostat::filters::TimeWindow;
//! use chrono::NaiveDate;
//!
//! let window = TimeWindow::from_dates(
//!     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
//!     &chrono_tz::Asia::Ho_Chi_Minh,
//! )
//! .unwrap();
//! assert_eq!(window.day_count(&chrono_tz::Asia::Ho_Chi_Minh), 31);
//! ```

use crate::error::{HydrostatError, Result};
use crate::timezone::{end_of_day, start_of_day};
use crate::types::{Granularity, LogRecord};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Inclusive range of instants `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(HydrostatError::InvalidArgument(format!(
                "window start {start} is after window end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window from local midnight of `since` to the last instant of `until`
    pub fn from_dates(since: NaiveDate, until: NaiveDate, tz: &Tz) -> Result<Self> {
        if since > until {
            return Err(HydrostatError::InvalidArgument(format!(
                "--since {since} is after --until {until}"
            )));
        }
        Self::new(start_of_day(since, tz)?, end_of_day(until, tz)?)
    }

    /// Window covering the current period and the `periods - 1` before it
    ///
    /// The window ends at the close of today in `tz`. Weeks start on Monday.
    /// A `periods` of zero is treated as one.
    pub fn trailing(
        granularity: Granularity,
        periods: usize,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<Self> {
        let today = now.with_timezone(tz).date_naive();
        let back = periods.saturating_sub(1);
        let overflow = || {
            HydrostatError::InvalidArgument(format!(
                "cannot go back {back} {granularity}s from {today}"
            ))
        };

        let start = match granularity {
            Granularity::Day => today.checked_sub_days(Days::new(back as u64)),
            Granularity::Week => {
                let since_monday = u64::from(today.weekday().num_days_from_monday());
                today
                    .checked_sub_days(Days::new(since_monday))
                    .and_then(|monday| monday.checked_sub_days(Days::new(7 * back as u64)))
            }
            Granularity::Month => {
                let months = u32::try_from(back).map_err(|_| overflow())?;
                today
                    .with_day(1)
                    .and_then(|first| first.checked_sub_months(Months::new(months)))
            }
        }
        .ok_or_else(overflow)?;

        Self::from_dates(start, today, tz)
    }

    /// Window ending the day before this one, shifted back by as many whole
    /// periods of `granularity` as this window touches
    ///
    /// The trailing month window starting Mar 1 is preceded by Feb 1 ..
    /// Feb 29, and a four-week window starting on a Monday by the four weeks
    /// before that Monday.
    pub fn preceding(&self, granularity: Granularity, tz: &Tz) -> Result<Self> {
        let since = self.start.with_timezone(tz).date_naive();
        let periods = self.period_count(granularity, tz);
        let overflow = || HydrostatError::InvalidArgument(format!("no period precedes {since}"));

        let until = since.pred_opt().ok_or_else(overflow)?;
        let start = match granularity {
            Granularity::Day => since.checked_sub_days(Days::new(periods)),
            Granularity::Week => periods
                .checked_mul(7)
                .and_then(|days| since.checked_sub_days(Days::new(days))),
            Granularity::Month => u32::try_from(periods)
                .ok()
                .and_then(|months| since.checked_sub_months(Months::new(months))),
        }
        .ok_or_else(overflow)?;

        Self::from_dates(start, until, tz)
    }

    /// Number of local calendar days the window touches
    pub fn day_count(&self, tz: &Tz) -> i64 {
        let first = self.start.with_timezone(tz).date_naive();
        let last = self.end.with_timezone(tz).date_naive();
        (last - first).num_days() + 1
    }

    /// Number of days, ISO weeks, or calendar months the window touches
    pub fn period_count(&self, granularity: Granularity, tz: &Tz) -> u64 {
        let first = self.start.with_timezone(tz).date_naive();
        let last = self.end.with_timezone(tz).date_naive();

        let count = match granularity {
            Granularity::Day => (last - first).num_days() + 1,
            Granularity::Week => {
                let monday = |d: NaiveDate| {
                    i64::from(d.num_days_from_ce()) - i64::from(d.weekday().num_days_from_monday())
                };
                (monday(last) - monday(first)) / 7 + 1
            }
            Granularity::Month => {
                let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
                months(last) - months(first) + 1
            }
        };
        u64::try_from(count).unwrap_or(1)
    }

    /// Whether `instant` lies inside the window (both ends inclusive)
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant <= self.end
    }

    /// Whether a record's timestamp lies inside the window
    pub fn matches(&self, record: &LogRecord) -> bool {
        self.contains(record.timestamp.inner())
    }

    /// Iterate over the records inside the window
    pub fn filter_records<'a>(
        &'a self,
        records: &'a [LogRecord],
    ) -> impl Iterator<Item = &'a LogRecord> + 'a {
        records.iter().filter(move |record| self.matches(record))
    }
}
