use std::future::Future;
use std::path::PathBuf;

use crate::domain::{
    common::entities::app_errors::CoreError,
    image_nutrition::{
        entities::{FoodRecord, FoodSearchPage, ImageNutritionReport},
        value_objects::{AnalyzeImageInput, ImageHandle, SamplingConfig},
    },
};

/// Client trait for the hosted vision-language model
#[cfg_attr(test, mockall::automock)]
pub trait VisionModelClient: Send + Sync {
    /// Uploads an image file to the model's file store so later calls can
    /// reference it without resending the bytes.
    fn upload_image(
        &self,
        path: PathBuf,
        mime_type: String,
    ) -> impl Future<Output = Result<ImageHandle, CoreError>> + Send;

    fn generate_with_image(
        &self,
        prompt: String,
        image: ImageHandle,
        sampling: SamplingConfig,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;

    /// Text-only generation constrained to JSON output via the given
    /// response schema.
    fn generate_json_with_text(
        &self,
        prompt: String,
        sampling: SamplingConfig,
        response_schema: serde_json::Value,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;
}

/// Client trait for the external nutrition database
#[cfg_attr(test, mockall::automock)]
pub trait NutritionDatabase: Send + Sync {
    fn search_foods(
        &self,
        query: String,
        page_size: u32,
    ) -> impl Future<Output = Result<FoodSearchPage, CoreError>> + Send;

    fn get_food(&self, fdc_id: u64) -> impl Future<Output = Result<FoodRecord, CoreError>> + Send;
}

/// Service trait for the image analysis flow
#[cfg_attr(test, mockall::automock)]
pub trait ImageNutritionService: Send + Sync {
    fn analyze_image(
        &self,
        input: AnalyzeImageInput,
    ) -> impl Future<Output = Result<ImageNutritionReport, CoreError>> + Send;
}
