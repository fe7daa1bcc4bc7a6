//! Health check handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::logic::model::Scorer;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
    monitor_running: bool,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.classifier.is_loaded(),
        monitor_running: state.monitor.is_running(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
