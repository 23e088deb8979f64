use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::errors::AppError;

// The IntoResponse trait implementation converts AppError into a well-formed HTTP response.
// Every variant renders the same JSON shape: {"error": "<message>"}.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),

            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),

            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, msg),

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),

            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),

            // Internal failures log the detail and answer with a generic body.
            AppError::Hash(e) => {
                tracing::error!("Password hashing failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
