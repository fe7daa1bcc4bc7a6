//! Model status and lifecycle handlers

use std::path::Path;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::logic::model::ModelStatus;
use crate::{ApiResult, AppState};

/// Current model status, feature layout, and inference counters
pub async fn status(State(state): State<AppState>) -> Json<ModelStatus> {
    Json(state.classifier.status())
}

/// Re-read the artifact from disk, replacing the live session on success.
/// The previous session keeps serving if the reload fails.
pub async fn reload(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let metadata = state.classifier.load_from_file(
        Path::new(&state.config.model_path),
        state.config.model_sha256.as_deref(),
    )?;

    Ok(Json(json!({
        "reloaded": true,
        "model": metadata
    })))
}
