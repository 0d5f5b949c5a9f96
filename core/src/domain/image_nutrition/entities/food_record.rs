use serde::{Deserialize, Serialize};

/// One page of search hits from the nutrition database. `foods` preserves
/// the database's ranking order; candidate numbering is derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSearchPage {
    pub total_hits: u64,
    pub foods: Vec<FoodSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSummary {
    pub fdc_id: u64,
    pub description: String,
    pub brand_owner: Option<String>,
}

/// Full nutrition record fetched by identifier. Fields the database may
/// omit are `Option`; absence is a normal state, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub fdc_id: u64,
    pub description: Option<String>,
    pub brand_owner: Option<String>,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub food_class: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub ingredients: Option<String>,
    pub nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodNutrient {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}
