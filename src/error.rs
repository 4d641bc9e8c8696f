use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use crate::services::api_client::ClientError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Upstream error: {0}")]
    Upstream(#[from] ClientError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Upstream(ClientError::Unauthorized(_)) => {
                (StatusCode::UNAUTHORIZED, "Not authorized".to_string())
            }
            AppError::Upstream(e) => {
                tracing::error!("Upstream error: {:?}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Malformed receipt data".to_string(),
                )
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
