use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use rust_decimal::Decimal;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::models::PriceSample;

/// Column names of the header row
pub const HEADER: [&str; 2] = ["Date", "Price"];

/// Timestamp format used for new rows
const WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Formats accepted when reading rows back
const READ_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Error)]
pub enum LogWriteError {
    #[error("Refusing to record negative price {0}")]
    NegativePrice(Decimal),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write row: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum LogReadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unexpected header '{0}' (expected 'Date,Price')")]
    Header(String),
    #[error("Malformed row at line {line}: {reason}")]
    Malformed { line: u64, reason: String },
    #[error("Failed to read price log: {0}")]
    Csv(#[from] csv::Error),
}

/// Append-only CSV record of every price sample
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add one sample to the end of the log
    ///
    /// Creates the file with its header row on first use. Existing rows are
    /// never rewritten, and negative prices are never written.
    pub fn append(&self, sample: &PriceSample) -> Result<(), LogWriteError> {
        if sample.price.is_sign_negative() {
            return Err(LogWriteError::NegativePrice(sample.price));
        }

        let io_err = |source: io::Error| LogWriteError::Io { path: self.path.clone(), source };

        let is_new = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(io_err(e)),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;

        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            debug!("Creating price log at {}", self.path.display());
            wtr.write_record(HEADER)?;
        }
        wtr.write_record([
            sample.timestamp.format(WRITE_FORMAT).to_string(),
            sample.price.to_string(),
        ])?;
        wtr.flush().map_err(io_err)
    }

    /// Read every sample in insertion order
    ///
    /// A missing or empty file is an empty history. Any malformed row fails
    /// the whole read.
    pub fn read_all(&self) -> Result<Vec<PriceSample>, LogReadError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(LogReadError::Io { path: self.path.clone(), source });
            }
        };

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        if headers.iter().ne(HEADER) {
            return Err(LogReadError::Header(headers.iter().collect::<Vec<_>>().join(",")));
        }

        let mut samples = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| match e.position().map(|p| p.line()) {
                Some(line) => LogReadError::Malformed { line, reason: e.to_string() },
                None => LogReadError::Csv(e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let sample = parse_record(&record)
                .map_err(|reason| LogReadError::Malformed { line, reason })?;
            samples.push(sample);
        }

        Ok(samples)
    }
}

fn parse_record(record: &StringRecord) -> Result<PriceSample, String> {
    let (Some(date), Some(raw_price)) = (record.get(0), record.get(1)) else {
        return Err(format!("expected 2 fields, found {}", record.len()));
    };

    let timestamp = READ_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(date, fmt).ok())
        .ok_or_else(|| format!("invalid date '{}'", date))?;

    let price = Decimal::from_str(raw_price)
        .map_err(|_| format!("invalid price '{}'", raw_price))?;
    if price.is_sign_negative() {
        return Err(format!("negative price '{}'", raw_price));
    }

    Ok(PriceSample::new(timestamp, price))
}
