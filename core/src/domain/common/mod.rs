pub mod entities;
pub mod services;

#[derive(Clone, Debug)]
pub struct NutriLensConfig {
    pub llm: LlmConfig,
    pub nutrition: NutritionDbConfig,
    pub coach: CoachConfig,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
}

#[derive(Clone, Debug)]
pub struct NutritionDbConfig {
    pub fdc_api_key: String,
}

#[derive(Clone, Debug)]
pub struct CoachConfig {
    pub enabled: bool,
}
