use axum::extract::DefaultBodyLimit;
use axum::{routing::post, Router};
use utoipa::OpenApi;

use super::handlers::analyze_image::{__path_analyze_image, analyze_image, MAX_IMAGE_SIZE};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(analyze_image))]
pub struct ImageNutritionApiDoc;

pub fn image_nutrition_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/image-nutrition", state.args.server.root_path),
            post(analyze_image),
        )
        .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 1024))
}
