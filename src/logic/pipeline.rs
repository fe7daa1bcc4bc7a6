//! Telemetry Pipeline
//!
//! One instance per stream, synchronous by contract: every ingest
//! validates the sample, updates the rolling window, extracts features,
//! and asks the classifier for a verdict. Invalid samples are logged,
//! dropped, and leave the window untouched. A missing classifier fails
//! the ingest after the window update, so history stays warm across
//! model outages and recovery scores with full context.

use std::sync::Arc;

use thiserror::Error;

use crate::logic::features::{extract, FeatureVector, InertiaWeights};
use crate::logic::model::{ModelError, RiskVerdict, Scorer};
use crate::logic::sample::{RawSample, SampleError};
use crate::logic::window::RollingWindow;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The sample never reached the window.
    #[error("invalid sample: {0}")]
    InvalidSample(#[from] SampleError),

    /// The window was updated but no verdict could be produced. There is
    /// deliberately no threshold fallback here.
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct TelemetryPipeline {
    window: RollingWindow,
    weights: InertiaWeights,
    scorer: Arc<dyn Scorer>,
    last_features: Option<FeatureVector>,
}

impl TelemetryPipeline {
    pub fn new(horizon_secs: u64, weights: InertiaWeights, scorer: Arc<dyn Scorer>) -> Self {
        Self {
            window: RollingWindow::new(horizon_secs),
            weights,
            scorer,
            last_features: None,
        }
    }

    /// Ingest one sample and score the resulting window state.
    pub fn ingest(&mut self, sample: RawSample) -> Result<RiskVerdict, PipelineError> {
        if let Err(e) = sample.validate() {
            tracing::warn!("Rejected sample: {}", e);
            return Err(e.into());
        }

        // Timestamps may repeat (same tick) but never go backwards.
        if let Some(newest_ts) = self.window.newest().map(|s| s.timestamp) {
            if sample.timestamp < newest_ts {
                let e = SampleError::NonMonotonic {
                    newest: newest_ts,
                    got: sample.timestamp,
                };
                tracing::warn!("Rejected sample: {}", e);
                return Err(e.into());
            }
        }

        self.window.push(sample);

        let features = extract::build(&self.window, &self.weights);
        let probabilities = self.scorer.score(&features)?;
        self.last_features = Some(features);

        Ok(RiskVerdict::from_probabilities(probabilities))
    }

    /// Drop all window state, ready for a fresh scenario.
    pub fn reset(&mut self) {
        self.window.clear();
        self.last_features = None;
    }

    /// Features computed by the most recent successful ingest.
    pub fn last_features(&self) -> Option<&FeatureVector> {
        self.last_features.as_ref()
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn window_span_secs(&self) -> f32 {
        self.window.span_secs()
    }
}

// ============================================================================
// TESTS
// ============================================================================
