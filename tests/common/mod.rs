//! Common test utilities and helpers for hydrostat tests
//!
//! Builders for log records and helpers that write record documents to
//! temporary files in the shapes the log-fetch service produces.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use hydrostat::{
    aggregation_types::Bucket,
    types::{ISOTimestamp, LogRecord},
};
use serde_json::json;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

/// Builder for creating test LogRecord instances
pub struct LogRecordBuilder {
    timestamp: DateTime<Utc>,
    amount: f64,
    note: Option<String>,
}

impl Default for LogRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LogRecordBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap(),
            amount: 250.0,
            note: None,
        }
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = ts;
        self
    }

    /// Set the timestamp from UTC calendar components
    pub fn with_date(mut self, year: i32, month: u32, day: u32, hour: u32) -> Self {
        self.timestamp = Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap();
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    /// Build the LogRecord
    pub fn build(self) -> LogRecord {
        let record = LogRecord::new(ISOTimestamp::new(self.timestamp), self.amount);
        match self.note {
            Some(note) => record.with_note(note),
            None => record,
        }
    }

    /// Build as a raw record in the fetch service's JSON shape
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = json!({
            "consumptionDate": self.timestamp.to_rfc3339(),
            "amountMl": self.amount,
        });
        if let Some(note) = &self.note {
            value["notes"] = json!(note);
        }
        value
    }
}

/// One record per `(day, amount)` in March 2024, logged at 08:00 UTC
pub fn march_records(days: &[(u32, f64)]) -> Vec<LogRecord> {
    days.iter()
        .map(|&(day, amount)| {
            LogRecordBuilder::new()
                .with_date(2024, 3, day, 8)
                .with_amount(amount)
                .build()
        })
        .collect()
}

/// Write `content` to a fresh temporary file
pub async fn write_temp_file(content: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let mut handle = tokio::fs::File::create(file.path())
        .await
        .expect("Failed to open temp file");
    handle
        .write_all(content.as_bytes())
        .await
        .expect("Failed to write temp file");
    handle.flush().await.expect("Failed to flush temp file");
    file
}

/// Wrap raw records in the `{ "records": [...] }` envelope
pub fn envelope(records: &[serde_json::Value]) -> String {
    json!({ "records": records, "total": records.len() }).to_string()
}

/// Totals of `buckets` in order
pub fn totals(buckets: &[Bucket]) -> Vec<f64> {
    buckets.iter().map(|b| b.total).collect()
}

/// Canonical keys of `buckets` in order
pub fn keys(buckets: &[Bucket]) -> Vec<String> {
    buckets.iter().map(|b| b.key.to_string()).collect()
}

/// Assert that two float values are approximately equal
pub fn assert_approx_eq(a: f64, b: f64, tolerance: f64) {
    assert!(
        (a - b).abs() < tolerance,
        "Values not approximately equal: {a} vs {b} (tolerance: {tolerance})"
    );
}
