use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::application::http::server::app_state::AppState;

pub fn health_routes(root_path: &str) -> Router<AppState> {
    Router::new()
        .route(&format!("{root_path}/"), get(root))
        .route(&format!("{root_path}/health"), get(health))
}

async fn root() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn health() -> &'static str {
    "ok"
}
