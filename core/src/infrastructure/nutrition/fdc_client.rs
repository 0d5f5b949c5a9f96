use reqwest::Client;
use serde::Deserialize;

use crate::domain::{
    common::entities::app_errors::CoreError,
    image_nutrition::{
        entities::{FoodNutrient, FoodRecord, FoodSearchPage, FoodSummary},
        ports::NutritionDatabase,
    },
};

const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

/// Client for the USDA FoodData Central REST API.
#[derive(Debug, Clone)]
pub struct FdcNutritionClient {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdcSearchResponse {
    #[serde(default)]
    total_hits: u64,
    #[serde(default)]
    foods: Vec<FdcSearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdcSearchFood {
    fdc_id: u64,
    description: String,
    brand_owner: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdcFoodDetail {
    fdc_id: u64,
    description: Option<String>,
    brand_owner: Option<String>,
    brand_name: Option<String>,
    food_category: Option<FdcFoodCategory>,
    food_class: Option<String>,
    serving_size: Option<f64>,
    serving_size_unit: Option<String>,
    ingredients: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<FdcFoodNutrient>,
}

/// The API reports the category as a bare string on some record types and
/// as a nested object on others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FdcFoodCategory {
    Name(String),
    Detailed { description: String },
}

impl FdcFoodCategory {
    fn into_name(self) -> String {
        match self {
            FdcFoodCategory::Name(name) => name,
            FdcFoodCategory::Detailed { description } => description,
        }
    }
}

/// Nutrient rows come nested (`nutrient.name` / `nutrient.unitName`) on full
/// records and flat (`nutrientName` / `unitName`) on abridged ones.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdcFoodNutrient {
    #[serde(default)]
    nutrient: Option<FdcNutrientRef>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    nutrient_name: Option<String>,
    #[serde(default)]
    unit_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdcNutrientRef {
    name: Option<String>,
    unit_name: Option<String>,
}

impl From<FdcFoodNutrient> for FoodNutrient {
    fn from(row: FdcFoodNutrient) -> Self {
        let (nested_name, nested_unit) = match row.nutrient {
            Some(nutrient) => (nutrient.name, nutrient.unit_name),
            None => (None, None),
        };
        FoodNutrient {
            name: nested_name.or(row.nutrient_name),
            amount: row.amount,
            unit: nested_unit.or(row.unit_name),
        }
    }
}

impl FdcNutritionClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            client: Client::new(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, CoreError> {
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("FoodData Central request failed: {}", e);
                CoreError::ExternalServiceError(format!("Nutrition database error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("FoodData Central error: {} - {}", status, error_text);
            return Err(CoreError::ExternalServiceError(format!(
                "Nutrition database returned error: {} - {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            tracing::error!("Failed to parse FoodData Central response: {}", e);
            CoreError::ExternalServiceError(format!(
                "Failed to parse nutrition database response: {}",
                e
            ))
        })
    }
}

impl NutritionDatabase for FdcNutritionClient {
    async fn search_foods(
        &self,
        query: String,
        page_size: u32,
    ) -> Result<FoodSearchPage, CoreError> {
        let url = format!("{}/foods/search", self.base_url);
        let params = [
            ("api_key", self.api_key.clone()),
            ("query", query),
            ("pageSize", page_size.to_string()),
        ];
        let response: FdcSearchResponse = self.get_json(url, &params).await?;

        Ok(FoodSearchPage {
            total_hits: response.total_hits,
            foods: response
                .foods
                .into_iter()
                .map(|food| FoodSummary {
                    fdc_id: food.fdc_id,
                    description: food.description,
                    brand_owner: food.brand_owner,
                })
                .collect(),
        })
    }

    async fn get_food(&self, fdc_id: u64) -> Result<FoodRecord, CoreError> {
        let url = format!("{}/food/{}", self.base_url, fdc_id);
        let params = [("api_key", self.api_key.clone())];
        let detail: FdcFoodDetail = self.get_json(url, &params).await?;

        Ok(FoodRecord {
            fdc_id: detail.fdc_id,
            description: detail.description,
            brand_owner: detail.brand_owner,
            brand_name: detail.brand_name,
            category: detail.food_category.map(FdcFoodCategory::into_name),
            food_class: detail.food_class,
            serving_size: detail.serving_size,
            serving_unit: detail.serving_size_unit,
            ingredients: detail.ingredients,
            nutrients: detail.food_nutrients.into_iter().map(Into::into).collect(),
        })
    }
}
