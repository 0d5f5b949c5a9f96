use axum::extract::{Multipart, State};

use crate::application::http::server::{
    api_entities::{api_error::ApiError, response::Response},
    app_state::AppState,
};
use nutrilens_core::domain::image_nutrition::{
    entities::ImageNutritionReport, ports::ImageNutritionService,
    value_objects::AnalyzeImageInput,
};

pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024; // 10MB

#[utoipa::path(
    post,
    path = "/image-nutrition",
    tag = "image-nutrition",
    summary = "Analyze a food photo",
    description = "Identifies the food on the uploaded image, resolves it against the nutrition \
                   database and, when coaching is enabled, proposes a healthier recipe",
    responses(
        (status = 200, body = ImageNutritionReport),
        (status = 400, description = "Missing file or non-image content type"),
        (status = 404, description = "No nutrition database match for the detected food"),
        (status = 422, description = "Model output was empty or not a usable candidate index"),
        (status = 500, description = "Unhandled error")
    ),
)]
pub async fn analyze_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response<ImageNutritionReport>, ApiError> {
    let mut content_type: Option<String> = None;
    let mut image_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                content_type = field.content_type().map(|ct| ct.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;

                if data.len() > MAX_IMAGE_SIZE {
                    return Err(ApiError::BadRequest(format!(
                        "Image too large. Max size is {} bytes",
                        MAX_IMAGE_SIZE
                    )));
                }

                image_data = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let image_data =
        image_data.ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;

    // Run the analysis on its own task: work already issued to the model or
    // the database keeps going even if the caller disconnects.
    let service = state.service.clone();
    let report = tokio::spawn(async move {
        service
            .analyze_image(AnalyzeImageInput {
                image_data,
                content_type,
            })
            .await
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("Unhandled error: {e}")))?
    .map_err(ApiError::from)?;

    Ok(Response::OK(report))
}
