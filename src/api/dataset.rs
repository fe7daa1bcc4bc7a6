//! Dataset handlers

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use crate::logic::dataset::DatasetStats;
use crate::{ApiError, ApiResult, AppState};

/// Recording status: file counts, sizes, rows written this session
pub async fn stats(State(state): State<AppState>) -> Json<DatasetStats> {
    match &state.dataset {
        Some(dataset) => Json(dataset.stats()),
        None => Json(DatasetStats::disabled()),
    }
}

/// Download every recorded file merged into one JSONL stream
pub async fn export(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let dataset = state
        .dataset
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("Dataset recording is disabled".to_string()))?;

    let (file_count, bytes) = dataset
        .export()
        .map_err(|e| ApiError::Internal(format!("Dataset export failed: {}", e)))?;

    tracing::info!("Exporting dataset ({} files, {} bytes)", file_count, bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/x-ndjson"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"telemetry-dataset.jsonl\"",
            ),
        ],
        bytes,
    ))
}
