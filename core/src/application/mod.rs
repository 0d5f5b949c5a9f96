use crate::domain::common::{services::Service, NutriLensConfig};
use crate::infrastructure::{llm::GeminiVisionClient, nutrition::FdcNutritionClient};

pub type NutriLensService = Service<GeminiVisionClient, FdcNutritionClient>;

/// Builds the concrete service with its long-lived client handles. Both
/// clients live for the whole process and are shared across requests.
pub fn create_service(config: NutriLensConfig) -> NutriLensService {
    let vision_client =
        GeminiVisionClient::new(config.llm.gemini_api_key, config.llm.gemini_model);
    let nutrition_db = FdcNutritionClient::new(config.nutrition.fdc_api_key);

    Service::new(vision_client, nutrition_db, config.coach.enabled)
}
