use std::fs;

use tempfile::tempdir;

use super::record::{DatasetRecord, SampleSource};
use super::writer::DatasetWriter;
use super::{export, DatasetLogger};
use crate::logic::features::FeatureVector;
use crate::logic::model::{RiskLevel, RiskVerdict};

fn sample_record(source: SampleSource) -> DatasetRecord {
    let features = FeatureVector::from_values([5.0, 42.0, 5.5, 41.8, 20.1, 0.05]);
    let verdict = RiskVerdict::from_probabilities([0.9, 0.08, 0.02]);
    DatasetRecord::from_scoring(source, &features, &verdict)
}

fn jsonl_paths(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut paths: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    paths.sort();
    paths
}

#[test]
fn test_append_writes_readable_jsonl_row() {
    let dir = tempdir().unwrap();
    let writer = DatasetWriter::from_path(dir.path().to_path_buf());

    let record = sample_record(SampleSource::Simulated);
    writer.append(&record).unwrap();

    let paths = jsonl_paths(dir.path());
    assert_eq!(paths.len(), 1);

    let name = paths[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("telemetry-"), "unexpected file name {name}");
    assert!(name.ends_with(".jsonl"), "unexpected file name {name}");

    let content = fs::read_to_string(&paths[0]).unwrap();
    let deserialized: DatasetRecord = serde_json::from_str(content.trim()).unwrap();

    assert_eq!(deserialized.id, record.id);
    assert_eq!(deserialized.source, SampleSource::Simulated);
    assert_eq!(deserialized.level, RiskLevel::Normal);
    assert_eq!(deserialized.features.len(), 6);
    assert_eq!(deserialized.probabilities.len(), 3);
    assert!(deserialized.user_label.is_none());
}

#[test]
fn test_append_reuses_open_file() {
    let dir = tempdir().unwrap();
    let writer = DatasetWriter::from_path(dir.path().to_path_buf());

    let record = sample_record(SampleSource::Live);
    writer.append(&record).unwrap();
    writer.append(&record).unwrap();
    writer.append(&record).unwrap();

    // Small writes never trigger rotation
    let paths = jsonl_paths(dir.path());
    assert_eq!(paths.len(), 1);

    let content = fs::read_to_string(&paths[0]).unwrap();
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn test_export_merges_files_in_order() {
    let dir = tempdir().unwrap();

    // Two files whose names sort chronologically
    fs::write(
        dir.path().join("telemetry-2025-01-01-000000.jsonl"),
        "{\"row\":1}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("telemetry-2025-01-02-000000.jsonl"),
        "{\"row\":2}",
    )
    .unwrap();

    let (file_count, bytes) = export::merged_jsonl(dir.path()).unwrap();
    assert_eq!(file_count, 2);

    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["{\"row\":1}", "{\"row\":2}"]);
}

#[test]
fn test_export_missing_dir_is_not_found() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = export::merged_jsonl(&missing).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}

#[test]
fn test_logger_counts_rows_and_reports_stats() {
    let dir = tempdir().unwrap();
    let logger = DatasetLogger::new(dir.path().to_path_buf());

    let features = FeatureVector::from_values([90.0, 85.0, 88.0, 80.0, 86.8, 0.8]);
    let verdict = RiskVerdict::from_probabilities([0.01, 0.11, 0.88]);

    logger.record(SampleSource::Live, &features, &verdict);
    logger.record(SampleSource::Simulated, &features, &verdict);

    let stats = logger.stats();
    assert!(stats.enabled);
    assert_eq!(stats.rows_written, 2);
    assert_eq!(stats.file_count, 1);
    assert!(stats.latest_file.is_some());
    assert!(stats.total_size_mb > 0.0);
}
