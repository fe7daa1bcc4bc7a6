//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::logic::model::classifier::ModelError;
use crate::logic::monitor::MonitorError;
use crate::logic::pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    // Sample rejected by validation
    InvalidSample(String),

    // Scoring cannot proceed without a model
    ModelUnavailable(String),

    // Monitor lifecycle errors
    Conflict(String),

    // Resource errors
    NotFound(String),

    // Generic errors
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::InvalidSample(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            ApiError::ModelUnavailable(msg) => {
                tracing::error!("Model unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.as_str())
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.as_str()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidSample(e) => ApiError::InvalidSample(e.to_string()),
            PipelineError::ModelUnavailable(e) => ApiError::ModelUnavailable(e.to_string()),
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NotFound(path) => {
                ApiError::NotFound(format!("Model file not found: {}", path.display()))
            }
            other => ApiError::ModelUnavailable(other.to_string()),
        }
    }
}

impl From<MonitorError> for ApiError {
    fn from(err: MonitorError) -> Self {
        ApiError::Conflict(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let resp = ApiError::InvalidSample("cpu out of range".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::ModelUnavailable("no model loaded".into()).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = ApiError::Conflict("already running".into()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = ApiError::NotFound("gone".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = ApiError::Internal("boom".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_model_error_mapping() {
        let err = ApiError::from(ModelError::NotLoaded);
        assert!(matches!(err, ApiError::ModelUnavailable(_)));

        let err = ApiError::from(ModelError::NotFound("models/x.onnx".into()));
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
