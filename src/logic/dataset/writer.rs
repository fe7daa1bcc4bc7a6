use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;

use crate::logic::dataset::record::DatasetRecord;

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

/// Appends JSONL rows with automatic file rotation. Files are named by
/// creation timestamp so lexicographic order is chronological order.
pub struct DatasetWriter {
    file: Mutex<Option<File>>,
    base_dir: PathBuf,
}

impl DatasetWriter {
    pub fn from_path(base_dir: PathBuf) -> Self {
        if let Err(e) = fs::create_dir_all(&base_dir) {
            tracing::error!("Failed to create dataset directory: {}", e);
        }

        Self {
            file: Mutex::new(None),
            base_dir,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Append one record, rotating when the current file is full.
    pub fn append(&self, record: &DatasetRecord) -> io::Result<()> {
        let mut file_guard = self.file.lock();

        // Lazily resume the newest file, or start a fresh one. The open
        // file is rechecked on every append since it grows under us.
        let needs_open = match file_guard.as_ref() {
            None => true,
            Some(f) => f.metadata()?.len() >= MAX_FILE_SIZE,
        };
        if needs_open {
            *file_guard = Some(self.open_for_append()?);
        }

        if let Some(file) = file_guard.as_mut() {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{}", json)?;
        }

        Ok(())
    }

    /// (file count, total size in MB, newest filename)
    pub fn scan_files(&self) -> io::Result<(usize, f32, Option<String>)> {
        let paths = self.jsonl_files()?;

        let mut size = 0u64;
        for path in &paths {
            size += fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        }

        let latest = paths
            .last()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(String::from);

        Ok((paths.len(), size as f32 / 1024.0 / 1024.0, latest))
    }

    /// Sorted (oldest first) list of dataset files in the base directory.
    fn jsonl_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut paths: Vec<_> = fs::read_dir(&self.base_dir)?
            .filter_map(|r| r.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "jsonl"))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// The newest file if it still has room, otherwise a fresh one.
    fn open_for_append(&self) -> io::Result<File> {
        if let Some(latest) = self.jsonl_files()?.pop() {
            let f = OpenOptions::new().create(true).append(true).open(&latest)?;
            if f.metadata()?.len() < MAX_FILE_SIZE {
                return Ok(f);
            }
        }

        let filename = format!("telemetry-{}.jsonl", Utc::now().format("%Y-%m-%d-%H%M%S"));
        let path = self.base_dir.join(filename);
        OpenOptions::new().create(true).append(true).open(path)
    }
}
