use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nutrilens_core::domain::common::entities::app_errors::CoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("{0}")]
    InternalServerError(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(detail) => ApiError::BadRequest(detail),
            CoreError::NoMatch(detail) => ApiError::NotFound(detail),
            CoreError::NoFoodDetected(detail) | CoreError::InvalidModelResponse(detail) => {
                ApiError::UnprocessableEntity(detail)
            }
            other => {
                // Catch-all: anything else surfaces as an opaque 500 with
                // the full error logged server-side.
                tracing::error!(error = %other, "unhandled error while analyzing image");
                ApiError::InternalServerError(format!("Unhandled error: {other}"))
            }
        }
    }
}
