//! Dataset Recording - Training Data Collection
//!
//! Records versioned feature vectors and verdicts for offline model retraining.
//! Stores data in JSONL format with automatic rotation.

pub mod export;
pub mod record;
pub mod writer;

#[cfg(test)]
mod tests;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureVector;
use crate::logic::model::RiskVerdict;

pub use record::{DatasetRecord, SampleSource};
use writer::DatasetWriter;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub enabled: bool,
    pub file_count: usize,
    pub total_size_mb: f32,
    pub latest_file: Option<String>,
    pub rows_written: u64,
    pub directory: Option<String>,
}

impl DatasetStats {
    /// Stats shape reported when recording is turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            file_count: 0,
            total_size_mb: 0.0,
            latest_file: None,
            rows_written: 0,
            directory: None,
        }
    }
}

/// Owns the rotating writer and counts rows written this process lifetime.
/// Recording failures are logged and swallowed so scoring never blocks on disk.
pub struct DatasetLogger {
    writer: DatasetWriter,
    rows_written: AtomicU64,
}

impl DatasetLogger {
    pub fn new(base_dir: PathBuf) -> Self {
        tracing::info!("Dataset recording enabled at {}", base_dir.display());
        Self {
            writer: DatasetWriter::from_path(base_dir),
            rows_written: AtomicU64::new(0),
        }
    }

    /// Record one scored sample. Never propagates IO errors to the caller.
    pub fn record(&self, source: SampleSource, features: &FeatureVector, verdict: &RiskVerdict) {
        let record = DatasetRecord::from_scoring(source, features, verdict);
        if let Err(e) = self.writer.append(&record) {
            tracing::error!("Failed to append to dataset: {}", e);
        } else {
            self.rows_written.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn stats(&self) -> DatasetStats {
        let rows_written = self.rows_written.load(Ordering::Relaxed);
        let (file_count, total_size_mb, latest_file) =
            self.writer.scan_files().unwrap_or((0, 0.0, None));

        DatasetStats {
            enabled: true,
            file_count,
            total_size_mb,
            latest_file,
            rows_written,
            directory: Some(self.writer.base_dir().display().to_string()),
        }
    }

    /// Merge every file into one JSONL payload for download.
    pub fn export(&self) -> io::Result<(usize, Vec<u8>)> {
        export::merged_jsonl(self.writer.base_dir())
    }
}
