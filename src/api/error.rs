use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::classifier::ClassifyError;
use crate::services::scratch::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Classification(#[from] ClassifyError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                // The underlying cause names filesystem paths; keep those
                // out of the response.
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store uploaded image".to_string(),
                )
            }
            AppError::Classification(e) => {
                tracing::error!("Classification failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Image classification failed: {}", e),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
