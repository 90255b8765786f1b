//! Per-request metrics as CSV rows.

use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use rewrite_python::server::{Outcome, RequestObserver};
use tracing::warn;

use crate::error::CliError;

pub const HEADER: &str = "timestamp,method,duration_ms,outcome";

/// Appends `timestamp,method,duration_ms,outcome` for every request.
pub struct CsvMetrics<W: Write> {
    out: W,
}

impl CsvMetrics<File> {
    /// Opens `path` for appending; a new or empty file gets the header.
    pub fn open(path: &Path) -> Result<Self, CliError> {
        let wrap = |source| CliError::MetricsFile {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(wrap)?;
        let is_new = file.metadata().map_err(wrap)?.len() == 0;
        CsvMetrics::new(file, is_new).map_err(wrap)
    }
}

impl<W: Write> CsvMetrics<W> {
    pub fn new(mut out: W, write_header: bool) -> io::Result<Self> {
        if write_header {
            writeln!(out, "{HEADER}")?;
            out.flush()?;
        }
        Ok(CsvMetrics { out })
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_row(&mut self, method: &str, elapsed: Duration, outcome: Outcome) -> io::Result<()> {
        writeln!(
            self.out,
            "{},{},{:.3},{}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            csv_field(method),
            elapsed.as_secs_f64() * 1000.0,
            outcome.as_str()
        )?;
        self.out.flush()
    }
}

/// Quotes a field that holds a delimiter, quote or line break (RFC 4180).
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

impl<W: Write> RequestObserver for CsvMetrics<W> {
    fn request_finished(&mut self, method: &str, elapsed: Duration, outcome: Outcome) {
        if let Err(err) = self.write_row(method, elapsed, outcome) {
            warn!(error = %err, "cannot write metrics row");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_follow_the_header() {
        let mut metrics = CsvMetrics::new(Vec::new(), true).unwrap();
        metrics.request_finished("Parse", Duration::from_micros(1500), Outcome::Ok);
        metrics.request_finished("Visit", Duration::from_millis(2), Outcome::Error);

        let text = String::from_utf8(metrics.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        let first: Vec<&str> = lines[1].split(',').collect();
        assert!(first[0].ends_with('Z'));
        assert_eq!(&first[1..], &["Parse", "1.500", "ok"]);
        assert!(lines[2].ends_with(",Visit,2.000,error"));
    }

    #[test]
    fn method_names_with_delimiters_are_quoted() {
        let mut metrics = CsvMetrics::new(Vec::new(), false).unwrap();
        metrics.request_finished("a,\"b\"", Duration::from_millis(1), Outcome::Error);

        let text = String::from_utf8(metrics.into_inner()).unwrap();
        assert!(text.ends_with(",\"a,\"\"b\"\"\",1.000,error\n"), "{text}");
        assert_eq!(csv_field("Parse"), "Parse");
    }

    #[test]
    fn header_is_written_once_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");

        let mut metrics = CsvMetrics::open(&path).unwrap();
        metrics.request_finished("Reset", Duration::ZERO, Outcome::Ok);
        drop(metrics);
        let mut metrics = CsvMetrics::open(&path).unwrap();
        metrics.request_finished("Reset", Duration::ZERO, Outcome::Ok);
        drop(metrics);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches(HEADER).count(), 1);
        assert_eq!(text.lines().count(), 3);
    }
}
