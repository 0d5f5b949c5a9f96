use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

/// JSON response envelope used by handlers.
pub struct Response<T>(StatusCode, T);

impl<T> Response<T> {
    #[allow(non_snake_case)]
    pub fn OK(body: T) -> Self {
        Response(StatusCode::OK, body)
    }
}

impl<T: Serialize> IntoResponse for Response<T> {
    fn into_response(self) -> axum::response::Response {
        (self.0, Json(self.1)).into_response()
    }
}
