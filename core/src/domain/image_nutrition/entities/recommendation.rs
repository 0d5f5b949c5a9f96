use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Healthier-recipe proposal parsed from the coach model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoachRecommendation {
    pub title: String,
    pub why_better: String,
    pub servings: u32,
    pub macros_per_serving: MacrosPerServing,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    pub prep_time_min: Option<u32>,
    pub cook_time_min: Option<u32>,
    #[serde(default)]
    pub dietary_swaps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MacrosPerServing {
    pub kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub sodium_mg: Option<f64>,
    pub sugar_g: Option<f64>,
}
