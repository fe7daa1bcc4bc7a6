//! Live monitor handlers

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::logic::monitor::{LiveSnapshot, MonitorStatus};
use crate::{ApiResult, AppState};

const DEFAULT_HISTORY_LIMIT: usize = 60;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// Monitor state and the latest scored snapshot
pub async fn status(State(state): State<AppState>) -> Json<MonitorStatus> {
    Json(state.monitor.status())
}

/// Start polling host sensors
pub async fn start(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.monitor.start()?;
    Ok(Json(json!({ "started": true })))
}

/// Stop the polling loop
pub async fn stop(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.monitor.stop()?;
    Ok(Json(json!({ "stopped": true })))
}

/// Most recent snapshots, oldest first
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<Vec<LiveSnapshot>> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Json(state.monitor.history(limit))
}
