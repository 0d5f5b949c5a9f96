use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::image_nutrition::entities::CoachRecommendation;

/// Response payload for one analyzed image: the detected label, the
/// resolved nutrition record, and optionally a coach recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImageNutritionReport {
    pub detected_label: String,
    pub fdc_id: u64,
    pub description: Option<String>,
    pub brand_owner: Option<String>,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "class")]
    pub food_class: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub ingredients: Option<String>,
    pub nutrients: Vec<NutrientEntry>,
    #[serde(rename = "Coach Recommendation", skip_serializing_if = "Option::is_none")]
    pub coach: Option<CoachRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NutrientEntry {
    pub name: String,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}
