//! Run-record sinks.
//!
//! Simulations hand finished [`RunRecord`]s to a [`TelemetrySink`] through
//! [`emit`], which logs failures instead of propagating them: telemetry never
//! stops a benchmark.

use std::fs;
use std::path::{Path, PathBuf};

use maze_core::{ErrorSeverity, MazeError};

use crate::benchmark::{BenchmarkLog, RunRecord};

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("telemetry I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("telemetry encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl MazeError for TelemetryError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            TelemetryError::Io(_) => "TELEMETRY_IO",
            TelemetryError::Json(_) => "TELEMETRY_JSON",
        }
    }
}

pub trait TelemetrySink {
    fn record(&mut self, record: &RunRecord) -> Result<(), TelemetryError>;
}

/// Writes `record` to `sink`, logging instead of failing.
pub fn emit(sink: &mut dyn TelemetrySink, record: &RunRecord) {
    if let Err(error) = sink.record(record) {
        tracing::warn!(code = error.error_code(), %error, "dropping run record");
    }
}

/// Opens the sink for `results_dir`.
///
/// Without a directory, or when the JSON sink cannot be opened, records are
/// kept in memory so the runs still go ahead.
pub fn open_sink(results_dir: Option<&Path>) -> Box<dyn TelemetrySink> {
    let Some(dir) = results_dir else {
        return Box::new(MemorySink::default());
    };
    match JsonSink::new(dir) {
        Ok(sink) => Box::new(sink),
        Err(error) => {
            tracing::warn!(
                code = error.error_code(),
                %error,
                dir = %dir.display(),
                "results unavailable, keeping records in memory"
            );
            Box::new(MemorySink::default())
        }
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub log: BenchmarkLog,
}

impl TelemetrySink for MemorySink {
    fn record(&mut self, record: &RunRecord) -> Result<(), TelemetryError> {
        self.log.push(record.clone());
        Ok(())
    }
}

/// Accumulates records and rewrites `benchmark.json` after each one.
///
/// Existing records in the file are kept, so repeated invocations append.
#[derive(Debug)]
pub struct JsonSink {
    path: PathBuf,
    log: BenchmarkLog,
}

impl JsonSink {
    pub const FILE_NAME: &'static str = "benchmark.json";

    pub fn new(dir: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::FILE_NAME);
        let log = if path.exists() {
            BenchmarkLog::load(&path)?
        } else {
            BenchmarkLog::default()
        };
        tracing::debug!(path = %path.display(), existing = log.records.len(), "json sink opened");
        Ok(Self { path, log })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self) -> &BenchmarkLog {
        &self.log
    }
}

impl TelemetrySink for JsonSink {
    fn record(&mut self, record: &RunRecord) -> Result<(), TelemetryError> {
        self.log.push(record.clone());
        self.log.save(&self.path)
    }
}
