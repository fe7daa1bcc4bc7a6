//! Simulation handlers
//!
//! Feed hand-crafted samples through a dedicated pipeline, independent of
//! the live monitor. This is how operators rehearse thermal scenarios and
//! how the demo panel drives the model.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::logic::dataset::SampleSource;
use crate::logic::features::FeatureVector;
use crate::logic::model::RiskVerdict;
use crate::logic::sample::RawSample;
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub cpu_percent: f32,
    pub temperature: f32,
    /// Defaults to now. Explicit timestamps let scripted scenarios
    /// compress an hour of telemetry into one request burst.
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub verdict: RiskVerdict,
    pub features: FeatureVector,
    pub window_len: usize,
    pub window_span_secs: f32,
}

/// Ingest one simulated sample and return its verdict
pub async fn ingest(
    State(state): State<AppState>,
    Json(req): Json<SimulateRequest>,
) -> ApiResult<Json<SimulateResponse>> {
    let timestamp = req.timestamp.unwrap_or_else(Utc::now);
    let sample = RawSample::new(timestamp, req.cpu_percent, req.temperature);

    let (verdict, features, window_len, window_span_secs) = {
        let mut pipeline = state.simulation.lock();
        let verdict = pipeline.ingest(sample)?;
        let features = pipeline
            .last_features()
            .cloned()
            .unwrap_or_else(FeatureVector::new);
        (
            verdict,
            features,
            pipeline.window_len(),
            pipeline.window_span_secs(),
        )
    };

    // Record outside the pipeline lock
    if let Some(dataset) = &state.dataset {
        dataset.record(SampleSource::Simulated, &features, &verdict);
    }

    Ok(Json(SimulateResponse {
        verdict,
        features,
        window_len,
        window_span_secs,
    }))
}

/// Clear the simulation window so a new scenario starts from scratch
pub async fn reset(State(state): State<AppState>) -> Json<Value> {
    state.simulation.lock().reset();
    tracing::info!("Simulation pipeline reset");

    Json(json!({ "reset": true }))
}
