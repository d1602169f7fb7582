//! Data loader for intake log records
//!
//! Reads records from a file or stdin in the shapes the log-fetch service
//! produces and validates them into [`LogRecord`]s. Three document layouts
//! are accepted:
//!
//! - the service envelope `{ "records": [ ... ] }`
//! - a bare JSON array of records
//! - JSON Lines, one record per line
//!
//! A document that is none of these is an error. Individual records that fail
//! validation are counted and skipped.
//!
//! # Examples
//!
//! ```no_run
//! use hydrostat::data_loader::DataLoader;
//!
//! # async fn example() -> hydrostat::Result<()> {
//! let loader = DataLoader::from_path("water-logs.json", chrono_tz::Asia::Ho_Chi_Minh);
//! let loaded = loader.load().await?;
//! println!("{} records, {} skipped", loaded.records.len(), loaded.skipped);
//! # Ok(())
//! # }
//! ```

use crate::error::{HydrostatError, Result};
use crate::types::{LogRecord, RawLogRecord};
use chrono_tz::Tz;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

/// Where records are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    Path(PathBuf),
    Stdin,
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Stdin => write!(f, "stdin"),
        }
    }
}

/// Validated records plus the number rejected
#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub records: Vec<LogRecord>,
    /// Records (or lines) that could not be used
    pub skipped: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordDocument {
    Envelope { records: Vec<Value> },
    List(Vec<Value>),
}

/// Loader for one record source
pub struct DataLoader {
    source: RecordSource,
    /// Zone used for timestamps that carry no offset
    timezone: Tz,
    show_progress: bool,
}

impl DataLoader {
    /// Read records from a file
    pub fn from_path(path: impl Into<PathBuf>, timezone: Tz) -> Self {
        Self {
            source: RecordSource::Path(path.into()),
            timezone,
            show_progress: false,
        }
    }

    /// Read records from standard input
    pub fn stdin(timezone: Tz) -> Self {
        Self {
            source: RecordSource::Stdin,
            timezone,
            show_progress: false,
        }
    }

    /// Interpret a CLI argument: `-` means stdin, anything else is a path
    pub fn from_arg(arg: &str, timezone: Tz) -> Self {
        if arg == "-" {
            Self::stdin(timezone)
        } else {
            Self::from_path(arg, timezone)
        }
    }

    /// Enable or disable the progress spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// The configured source
    pub fn source(&self) -> &RecordSource {
        &self.source
    }

    /// Read and validate all records
    ///
    /// # Errors
    ///
    /// Returns `Io` if the source cannot be read and `Parse` if its content
    /// is not a records document.
    pub async fn load(&self) -> Result<LoadedRecords> {
        let progress = self.spinner();

        let content = match &self.source {
            RecordSource::Path(path) => tokio::fs::read_to_string(path).await?,
            RecordSource::Stdin => {
                let mut buffer = String::new();
                tokio::io::stdin().read_to_string(&mut buffer).await?;
                buffer
            }
        };
        debug!("Read {} bytes from {}", content.len(), self.source);

        if let Some(pb) = &progress {
            pb.set_message(format!("Validating records from {}", self.source));
        }

        let input = self.source.to_string();
        let timezone = self.timezone;
        let loaded =
            tokio::task::spawn_blocking(move || parse_document(&content, &input, &timezone))
                .await
                .map_err(|e| HydrostatError::Io(std::io::Error::other(e)))??;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        if loaded.skipped > 0 {
            warn!(
                "Skipped {} malformed records from {}",
                loaded.skipped, self.source
            );
        }
        debug!("Loaded {} records from {}", loaded.records.len(), self.source);
        Ok(loaded)
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Reading records from {}", self.source));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    }
}

/// Parse and validate a records document
///
/// `input` names the source in error messages. `tz` resolves timestamps that
/// have no offset. Empty content yields no records.
pub fn parse_document(content: &str, input: &str, tz: &Tz) -> Result<LoadedRecords> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(LoadedRecords::default());
    }

    let (values, unreadable) = match serde_json::from_str::<RecordDocument>(trimmed) {
        Ok(RecordDocument::Envelope { records }) | Ok(RecordDocument::List(records)) => {
            (records, 0)
        }
        Err(_) => parse_json_lines(trimmed, input)?,
    };

    let mut loaded = validate_records(values, tz);
    loaded.skipped += unreadable;
    Ok(loaded)
}

/// Split JSON Lines content into record objects, counting unreadable lines
fn parse_json_lines(content: &str, input: &str) -> Result<(Vec<Value>, usize)> {
    let mut values = Vec::new();
    let mut unreadable = 0;

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(value @ Value::Object(_)) => values.push(value),
            _ => {
                debug!("Skipping unreadable line {} in {}", index + 1, input);
                unreadable += 1;
            }
        }
    }

    if values.is_empty() {
        return Err(HydrostatError::Parse {
            input: input.to_string(),
            error: "expected a {\"records\": [...]} object, a JSON array, or JSON Lines"
                .to_string(),
        });
    }

    Ok((values, unreadable))
}

fn validate_records(values: Vec<Value>, tz: &Tz) -> LoadedRecords {
    let total = values.len();
    let records: Vec<LogRecord> = values
        .into_par_iter()
        .filter_map(|value| {
            serde_json::from_value::<RawLogRecord>(value)
                .ok()
                .and_then(|raw| LogRecord::from_raw(raw, tz))
        })
        .collect();

    LoadedRecords {
        skipped: total - records.len(),
        records,
    }
}
