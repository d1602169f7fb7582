//! Core domain types for hydrostat
//!
//! This module contains the fundamental types used throughout the hydrostat
//! library: timestamps, validated intake records, the raw record shape
//! returned by the log-fetch service, aggregation granularities, and the
//! period keys that buckets are grouped by.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::timezone::local_to_utc;

/// Naive date-time layouts accepted for timestamps without an offset
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// ISO timestamp wrapper for UTC instants
///
/// # Examples
/// ```
/// use hydrostat_core::types::ISOTimestamp;
/// use chrono::NaiveDate;
///
/// let ts = ISOTimestamp::parse("2024-03-15T23:30:00Z", &chrono_tz::UTC).unwrap();
/// let local = ts.local_date(&chrono_tz::Asia::Ho_Chi_Minh);
/// assert_eq!(local, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ISOTimestamp(DateTime<Utc>);

impl ISOTimestamp {
    /// Create a new ISOTimestamp
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner DateTime
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Calendar date of this instant in `tz`
    pub fn local_date(&self, tz: &Tz) -> NaiveDate {
        self.0.with_timezone(tz).date_naive()
    }

    /// Parse a timestamp as sent by the log-fetch service
    ///
    /// Values carrying an offset (`Z`, `+07:00`) are taken as-is. Values
    /// without one, including bare calendar dates, are wall-clock times in
    /// `tz`; a bare date means local midnight. Returns `None` for anything
    /// unparsable.
    pub fn parse(value: &str, tz: &Tz) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Some(Self(dt.with_timezone(&Utc)));
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
                return local_to_utc(naive, tz).map(Self);
            }
        }

        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .and_then(|naive| local_to_utc(naive, tz))
            .map(Self)
    }
}

impl AsRef<DateTime<Utc>> for ISOTimestamp {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for ISOTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// Period size used to group records
///
/// # Examples
/// ```
/// use hydrostat_core::types::Granularity;
///
/// let g: Granularity = "weekly".parse().unwrap();
/// assert_eq!(g, Granularity::Week);
/// assert_eq!(g.to_string(), "week");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Calendar day
    #[default]
    Day,
    /// ISO 8601 week (Monday to Sunday)
    Week,
    /// Calendar month
    Month,
}

impl Granularity {
    /// Default number of buckets shown for this granularity
    ///
    /// Matches the analytics screen's ranges: a week of days, four weeks,
    /// a year of months.
    pub fn default_max_buckets(&self) -> usize {
        match self {
            Self::Day => 7,
            Self::Week => 4,
            Self::Month => 12,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            _ => Err(format!("Invalid granularity: {s}")),
        }
    }
}

/// Canonical key of an aggregation period
///
/// Ordering is chronological within a granularity: days by date, weeks by
/// ISO week-year then week number, months by year then month. Keys are
/// compared as numbers, never as strings, so `2024-W02` sorts before
/// `2024-W10`.
///
/// # Examples
/// ```
/// use hydrostat_core::types::{BucketKey, Granularity};
/// use chrono::NaiveDate;
///
/// // 2021-01-01 falls in ISO week 53 of 2020
/// let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
/// let key = BucketKey::from_date(date, Granularity::Week);
/// assert_eq!(key.to_string(), "2020-W53");
/// assert_eq!(key.label(), "W53");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    /// A calendar day
    Day(NaiveDate),
    /// An ISO week within an ISO week-year
    Week { year: i32, week: u32 },
    /// A calendar month
    Month { year: i32, month: u32 },
}

impl BucketKey {
    /// Key of the period containing `date`
    pub fn from_date(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Day => Self::Day(date),
            Granularity::Week => {
                let iso = date.iso_week();
                Self::Week {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
            Granularity::Month => Self::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }

    /// Granularity this key belongs to
    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Day(_) => Granularity::Day,
            Self::Week { .. } => Granularity::Week,
            Self::Month { .. } => Granularity::Month,
        }
    }

    /// First calendar day of the period
    pub fn period_start(&self) -> Option<NaiveDate> {
        match *self {
            Self::Day(date) => Some(date),
            Self::Week { year, week } => {
                NaiveDate::from_isoywd_opt(year, week, chrono::Weekday::Mon)
            }
            Self::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
        }
    }

    /// Short human-readable label: `Mar 15`, `W11`, `Mar 24`
    pub fn label(&self) -> String {
        match *self {
            Self::Day(date) => date.format("%b %-d").to_string(),
            Self::Week { week, .. } => format!("W{week}"),
            Self::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1)
                .map(|d| d.format("%b %y").to_string())
                .unwrap_or_else(|| self.to_string()),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Week { year, week } => write!(f, "{year:04}-W{week:02}"),
            Self::Month { year, month } => write!(f, "{year:04}-{month:02}"),
        }
    }
}

impl FromStr for BucketKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((year, week)) = s.split_once("-W") {
            let year = year
                .parse::<i32>()
                .map_err(|_| format!("Invalid week-year in '{s}'"))?;
            let week = week
                .parse::<u32>()
                .map_err(|_| format!("Invalid week number in '{s}'"))?;
            // Rejects week 53 in years that only have 52
            NaiveDate::from_isoywd_opt(year, week, chrono::Weekday::Mon)
                .ok_or_else(|| format!("Week {week} does not exist in {year}"))?;
            return Ok(Self::Week { year, week });
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::Day(date));
        }

        if let Some((year, month)) = s.split_once('-') {
            let year = year
                .parse::<i32>()
                .map_err(|_| format!("Invalid year in '{s}'"))?;
            let month = month
                .parse::<u32>()
                .map_err(|_| format!("Invalid month in '{s}'"))?;
            if !(1..=12).contains(&month) {
                return Err(format!("Month must be between 1-12, got {month}"));
            }
            return Ok(Self::Month { year, month });
        }

        Err(format!(
            "Invalid bucket key '{s}', expected YYYY-MM-DD, YYYY-Www or YYYY-MM"
        ))
    }
}

impl Serialize for BucketKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BucketKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw intake record as returned by the log-fetch service
///
/// Every field is optional so one malformed record never fails a whole
/// document; [`LogRecord::from_raw`] decides what is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLogRecord {
    /// When the water was consumed
    #[serde(rename = "consumptionDate", alias = "timestamp", default)]
    pub consumption_date: Option<String>,
    /// Amount in milliliters; kept as a raw JSON value until validated
    #[serde(rename = "amountMl", alias = "amount", default)]
    pub amount_ml: Option<Value>,
    /// Free-text note
    #[serde(alias = "note", default)]
    pub notes: Option<String>,
}

/// A validated intake log record
///
/// # Examples
/// ```
/// use hydrostat_core::types::{ISOTimestamp, LogRecord};
/// use chrono::{TimeZone, Utc};
///
/// let record = LogRecord::new(
///     ISOTimestamp::new(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()),
///     250.0,
/// )
/// .with_note("morning glass");
/// assert!(record.has_valid_amount());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// When the log occurred
    pub timestamp: ISOTimestamp,
    /// Non-negative quantity (milliliters)
    pub amount: f64,
    /// Free-text note, carried for display only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

impl LogRecord {
    /// Create a record without a note
    pub fn new(timestamp: ISOTimestamp, amount: f64) -> Self {
        Self {
            timestamp,
            amount,
            note: None,
        }
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Whether the amount is a finite, non-negative number
    pub fn has_valid_amount(&self) -> bool {
        self.amount.is_finite() && self.amount >= 0.0
    }

    /// Key of the period this record falls in, localized to `tz`
    pub fn bucket_key(&self, granularity: Granularity, tz: &Tz) -> BucketKey {
        BucketKey::from_date(self.timestamp.local_date(tz), granularity)
    }

    /// Validate a raw record
    ///
    /// Returns `None` when the timestamp is missing or unparsable, or the
    /// amount is missing, non-numeric, negative, or not finite.
    pub fn from_raw(raw: RawLogRecord, tz: &Tz) -> Option<Self> {
        let Some(date_str) = raw.consumption_date.as_deref() else {
            tracing::debug!("Skipping record without a consumption date");
            return None;
        };

        let Some(timestamp) = ISOTimestamp::parse(date_str, tz) else {
            tracing::debug!("Skipping record with unparsable timestamp: {}", date_str);
            return None;
        };

        let Some(amount) = raw.amount_ml.as_ref().and_then(parse_amount) else {
            tracing::debug!(
                "Skipping record at {} with invalid amount: {:?}",
                date_str,
                raw.amount_ml
            );
            return None;
        };

        Some(Self {
            timestamp,
            amount,
            note: raw.notes,
        })
    }
}

/// Accept numbers and numeric strings that are finite and non-negative
fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}
