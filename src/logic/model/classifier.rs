//! ONNX Classifier - native Random Forest inference
//!
//! Loads the trained artifact and turns feature vectors into class
//! probabilities. There is no heuristic fallback: when the model is
//! missing or broken the caller gets an error and decides what to do.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::verdict::CLASS_COUNT;
use crate::logic::features::{
    validate_layout, FeatureVector, LayoutInfo, FEATURE_COUNT,
};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Output tensor carrying per-class probabilities. skl2onnx (zipmap off)
/// declares `label` first and `probabilities` second.
const PROBABILITIES_OUTPUT: &str = "probabilities";

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("model artifact not found at {0}")]
    NotFound(PathBuf),

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("onnx session error: {0}")]
    Session(String),

    #[error("model not loaded")]
    NotLoaded,

    #[error("model returned no usable probability output")]
    BadOutput,

    #[error("{0}")]
    LayoutMismatch(String),
}

// ============================================================================
// SCORER TRAIT
// ============================================================================

/// Seam between the pipeline and whatever produces class probabilities.
pub trait Scorer: Send + Sync {
    fn score(&self, features: &FeatureVector) -> Result<[f32; CLASS_COUNT], ModelError>;
    fn is_loaded(&self) -> bool;
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Metadata captured on a successful load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub sha256: String,
    pub size_bytes: u64,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Status snapshot for the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub metadata: Option<ModelMetadata>,
    pub layout: LayoutInfo,
    pub class_count: usize,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

// ============================================================================
// ONNX CLASSIFIER
// ============================================================================

/// Shared classifier handle. The session sits behind a lock because the
/// ONNX runtime needs exclusive access to run, and behind an Option so
/// the service can boot, report "unloaded", and recover via reload.
pub struct OnnxClassifier {
    session: RwLock<Option<Session>>,
    metadata: RwLock<Option<ModelMetadata>>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl OnnxClassifier {
    pub fn unloaded() -> Self {
        Self {
            session: RwLock::new(None),
            metadata: RwLock::new(None),
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    /// Read, verify, and load the artifact. The checksum is verified
    /// before a session is built so a corrupt file never reaches the
    /// runtime. On failure the previous session (if any) stays in place.
    pub fn load_from_file(
        &self,
        path: &Path,
        expected_sha256: Option<&str>,
    ) -> Result<ModelMetadata, ModelError> {
        let bytes = std::fs::read(path).map_err(|_| ModelError::NotFound(path.to_path_buf()))?;
        let digest = hex::encode(Sha256::digest(&bytes));

        if let Some(expected) = expected_sha256 {
            if !expected.eq_ignore_ascii_case(&digest) {
                return Err(ModelError::ChecksumMismatch {
                    expected: expected.to_string(),
                    actual: digest,
                });
            }
        }

        let session = Session::builder()
            .map_err(|e| ModelError::Session(format!("failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Session(format!("failed to set optimization: {}", e)))?
            .commit_from_memory(&bytes)
            .map_err(|e| ModelError::Session(format!("failed to load model: {}", e)))?;

        let metadata = ModelMetadata {
            model_path: path.display().to_string(),
            sha256: digest,
            size_bytes: bytes.len() as u64,
            loaded_at: chrono::Utc::now(),
        };

        *self.session.write() = Some(session);
        *self.metadata.write() = Some(metadata.clone());

        tracing::info!(
            "ONNX model loaded from {} ({} bytes, sha256 {})",
            metadata.model_path,
            metadata.size_bytes,
            &metadata.sha256[..12]
        );
        Ok(metadata)
    }

    pub fn unload(&self) {
        *self.session.write() = None;
        *self.metadata.write() = None;
        tracing::info!("ONNX model unloaded");
    }

    pub fn status(&self) -> ModelStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 {
            (sum as f32 / count as f32) / 1000.0
        } else {
            0.0
        };

        ModelStatus {
            loaded: self.session.read().is_some(),
            metadata: self.metadata.read().clone(),
            layout: LayoutInfo::current(),
            class_count: CLASS_COUNT,
            avg_latency_ms: avg,
            inference_count: count,
        }
    }

    fn run_session(&self, features: &FeatureVector) -> Result<[f32; CLASS_COUNT], ModelError> {
        validate_layout(features.version, features.layout_hash)
            .map_err(|e| ModelError::LayoutMismatch(e.to_string()))?;

        let start_time = Instant::now();

        // Write lock: Session::run needs &mut.
        let mut session_guard = self.session.write();
        let session = session_guard.as_mut().ok_or(ModelError::NotLoaded)?;

        let input_array =
            Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), features.as_slice().to_vec())
                .map_err(|e| ModelError::Session(format!("failed to create array: {}", e)))?;

        // Get output name BEFORE run to avoid borrow conflict.
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == PROBABILITIES_OUTPUT)
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or(ModelError::BadOutput)?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ModelError::Session(format!("failed to create tensor: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Session(format!("inference failed: {}", e)))?;

        let output = outputs.get(&output_name).ok_or(ModelError::BadOutput)?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Session(format!("failed to extract output: {}", e)))?;

        let data = output_tensor.1;
        if data.len() < CLASS_COUNT {
            return Err(ModelError::BadOutput);
        }

        let mut probabilities = [0.0f32; CLASS_COUNT];
        probabilities.copy_from_slice(&data[..CLASS_COUNT]);

        let elapsed = start_time.elapsed().as_micros() as u64;
        self.latency_sum_us.fetch_add(elapsed, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        Ok(probabilities)
    }
}

impl Scorer for OnnxClassifier {
    fn score(&self, features: &FeatureVector) -> Result<[f32; CLASS_COUNT], ModelError> {
        self.run_session(features)
    }

    fn is_loaded(&self) -> bool {
        self.session.read().is_some()
    }
}

// ============================================================================
// TEST SCORER
// ============================================================================

#[cfg(test)]
pub(crate) mod stub {
    use super::*;

    /// Deterministic scorer for pipeline and monitor tests: a smooth risk
    /// score from inertia, temperature, and climb rate, mapped onto a
    /// three-class simplex. No ONNX runtime involved.
    pub(crate) struct StubScorer;

    impl StubScorer {
        fn risk(features: &FeatureVector) -> f32 {
            let inertia = features.get_by_name("thermal_inertia").unwrap_or(0.0);
            let temp = features.get_by_name("instant_temp").unwrap_or(0.0);
            let rate = features.get_by_name("temp_rate_of_change").unwrap_or(0.0);

            let heat = (inertia / 100.0).clamp(0.0, 1.0);
            let warmth = ((temp - 40.0) / 60.0).clamp(0.0, 1.0);
            let climb = (rate / 2.0).clamp(0.0, 1.0);

            0.5 * heat + 0.3 * warmth + 0.2 * climb
        }

        fn class_weights(r: f32) -> [f32; CLASS_COUNT] {
            let normal = (1.0 - r / 0.3).max(0.0);
            let warning = (1.0 - (r - 0.3).abs() / 0.3).max(0.0);
            let critical = ((r - 0.3) / 0.3).max(0.0);

            let w = [normal * normal, warning * warning, critical * critical];
            let sum: f32 = w.iter().sum();
            if sum <= f32::EPSILON {
                return [1.0, 0.0, 0.0];
            }
            [w[0] / sum, w[1] / sum, w[2] / sum]
        }
    }

    impl Scorer for StubScorer {
        fn score(&self, features: &FeatureVector) -> Result<[f32; CLASS_COUNT], ModelError> {
            Ok(Self::class_weights(Self::risk(features)))
        }

        fn is_loaded(&self) -> bool {
            true
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_unloaded_scores_as_not_loaded() {
        let classifier = OnnxClassifier::unloaded();
        let features = FeatureVector::new();

        assert!(!classifier.is_loaded());
        assert!(matches!(
            classifier.score(&features),
            Err(ModelError::NotLoaded)
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let classifier = OnnxClassifier::unloaded();
        let result = classifier.load_from_file(Path::new("/nonexistent/model.onnx"), None);
        assert!(matches!(result, Err(ModelError::NotFound(_))));
        assert!(!classifier.is_loaded());
    }

    #[test]
    fn test_checksum_mismatch_blocks_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"definitely not a model").unwrap();

        let classifier = OnnxClassifier::unloaded();
        let result = classifier.load_from_file(&path, Some("deadbeef"));

        match result {
            Err(ModelError::ChecksumMismatch { expected, actual }) => {
                assert_eq!(expected, "deadbeef");
                assert_eq!(actual.len(), 64);
            }
            other => panic!("expected checksum mismatch, got {:?}", other.map(|m| m.sha256)),
        }
        assert!(!classifier.is_loaded());
    }

    #[test]
    fn test_invalid_artifact_rejected_by_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"definitely not a model").unwrap();

        // Correct digest for the garbage bytes, so the failure comes from
        // the session build, not the checksum gate.
        let digest = hex::encode(Sha256::digest(b"definitely not a model"));

        let classifier = OnnxClassifier::unloaded();
        let result = classifier.load_from_file(&path, Some(&digest));
        assert!(matches!(result, Err(ModelError::Session(_))));
        assert!(!classifier.is_loaded());
    }

    #[test]
    fn test_layout_mismatch_rejected_before_session_lookup() {
        let classifier = OnnxClassifier::unloaded();
        let mut features = FeatureVector::new();
        features.version += 1;

        // A stale vector must fail on layout, not on the missing session.
        assert!(matches!(
            classifier.score(&features),
            Err(ModelError::LayoutMismatch(_))
        ));
    }

    #[test]
    fn test_status_when_unloaded() {
        let classifier = OnnxClassifier::unloaded();
        let status = classifier.status();

        assert!(!status.loaded);
        assert!(status.metadata.is_none());
        assert_eq!(status.class_count, CLASS_COUNT);
        assert_eq!(status.layout.feature_count, FEATURE_COUNT);
        assert_eq!(status.inference_count, 0);
        assert_eq!(status.avg_latency_ms, 0.0);
    }

    #[test]
    fn test_stub_scorer_distribution_sums_to_one() {
        use stub::StubScorer;

        let features = FeatureVector::from_values([95.0, 85.0, 90.0, 70.0, 88.0, 0.8]);
        let probs = StubScorer.score(&features).unwrap();
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}
