//! Timezone utilities for date handling
//!
//! Every bucket key is computed from a timestamp localized to one configured
//! zone. This module resolves that zone from user input (or the system) and
//! converts local wall-clock times back to UTC instants.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

use crate::error::{HydrostatError, Result};

/// Configuration for timezone handling
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    /// The timezone to use for date operations
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self::new(get_local_timezone())
    }
}

impl TimezoneConfig {
    /// Create a configuration for an explicit timezone
    pub fn new(tz: Tz) -> Self {
        Self {
            is_utc: tz == Tz::UTC,
            tz,
        }
    }

    /// Create a configuration that always uses UTC
    pub fn utc() -> Self {
        Self::new(Tz::UTC)
    }

    /// Create a new timezone configuration from CLI arguments
    ///
    /// `--utc` wins over `--timezone`; with neither, the system zone is used.
    pub fn from_cli(timezone_str: Option<&str>, use_utc: bool) -> Result<Self> {
        if use_utc {
            return Ok(Self::utc());
        }

        match timezone_str {
            Some(tz_str) => parse_timezone(tz_str).map(Self::new),
            None => Ok(Self::default()),
        }
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }
}

/// Parse an IANA timezone name such as `Asia/Ho_Chi_Minh`
pub fn parse_timezone(tz_str: &str) -> Result<Tz> {
    Tz::from_str(tz_str.trim()).map_err(|_| {
        HydrostatError::InvalidTimezone(format!(
            "'{tz_str}'. Use format like 'America/New_York', 'Asia/Ho_Chi_Minh', or 'UTC'"
        ))
    })
}

/// Detect the system's local timezone
///
/// Checks the `TZ` environment variable first, then asks the OS through
/// `iana-time-zone`. Falls back to UTC when neither yields a known zone.
pub fn get_local_timezone() -> Tz {
    if let Ok(tz_str) = std::env::var("TZ")
        && let Ok(tz) = Tz::from_str(&tz_str)
    {
        debug!("Using timezone from TZ environment variable: {}", tz_str);
        return tz;
    }

    match iana_time_zone::get_timezone() {
        Ok(tz_str) => match Tz::from_str(&tz_str) {
            Ok(tz) => {
                debug!("Using system timezone from iana-time-zone: {}", tz_str);
                tz
            }
            Err(_) => {
                debug!(
                    "Could not parse timezone from iana-time-zone: '{}', falling back to UTC",
                    tz_str
                );
                Tz::UTC
            }
        },
        Err(e) => {
            debug!(
                "Could not detect local timezone via iana-time-zone: {:?}, falling back to UTC",
                e
            );
            Tz::UTC
        }
    }
}

/// Convert a wall-clock time in `tz` to a UTC instant
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times
/// inside a DST gap are moved forward by one hour; `None` only if that also
/// fails to exist.
pub fn local_to_utc(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// First instant of `date` in `tz`
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|naive| local_to_utc(naive, tz))
        .ok_or_else(|| {
            HydrostatError::InvalidDate(format!("{date} has no start of day in {}", tz.name()))
        })
}

/// Last instant of `date` in `tz` (one nanosecond before the next local midnight)
pub fn end_of_day(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>> {
    let next = date
        .succ_opt()
        .ok_or_else(|| HydrostatError::InvalidDate(format!("{date} is the last representable day")))?;
    Ok(start_of_day(next, tz)? - Duration::nanoseconds(1))
}
