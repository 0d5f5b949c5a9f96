use std::io::Write;

use serde_json::json;

use crate::domain::{
    common::{entities::app_errors::CoreError, services::Service},
    image_nutrition::{
        entities::{CoachRecommendation, FoodRecord, ImageNutritionReport, NutrientEntry},
        helpers::{find_candidate_index, pick_nutrients, strip_json_fences},
        ports::{ImageNutritionService, NutritionDatabase, VisionModelClient},
        prompts::{coach_prompt, IDENTIFY_FOOD_PROMPT, SELECT_CANDIDATE_PROMPT},
        schema::coach_recommendation_schema,
        value_objects::{AnalyzeImageInput, SamplingConfig},
    },
};

/// Hits requested from the nutrition database per search.
const SEARCH_PAGE_SIZE: u32 = 200;

/// Candidates shown to the model for disambiguation.
const MAX_CANDIDATES: usize = 50;

impl<V, N> ImageNutritionService for Service<V, N>
where
    V: VisionModelClient,
    N: NutritionDatabase,
{
    async fn analyze_image(
        &self,
        input: AnalyzeImageInput,
    ) -> Result<ImageNutritionReport, CoreError> {
        // 1. Validate the declared content type
        let content_type = input.content_type.clone().unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(CoreError::InvalidInput(
                "Please upload an image/* file.".to_string(),
            ));
        }

        // 2. Persist the upload to a scoped temp file. The file is removed
        //    when `tmp` drops, on every exit path; removal failures are
        //    swallowed by the drop impl. The suffix follows the declared
        //    content type, not the actual bytes.
        let suffix = if content_type.contains("jpeg") {
            ".jpg"
        } else {
            ".png"
        };
        let mut tmp = tempfile::Builder::new()
            .prefix("nutrilens-upload-")
            .suffix(suffix)
            .tempfile()
            .map_err(|e| CoreError::Io(format!("Failed to create temp file: {e}")))?;
        tmp.write_all(&input.image_data)
            .and_then(|_| tmp.flush())
            .map_err(|e| CoreError::Io(format!("Failed to write temp file: {e}")))?;

        let image = self
            .vision_client
            .upload_image(tmp.path().to_path_buf(), content_type.clone())
            .await?;

        // 3. Ask for ONE concise food label (brand if visible)
        let label = self
            .vision_client
            .generate_with_image(
                IDENTIFY_FOOD_PROMPT.to_string(),
                image.clone(),
                SamplingConfig::LABELING,
            )
            .await?;
        let food_query = label.trim().to_string();
        if food_query.is_empty() {
            return Err(CoreError::NoFoodDetected(
                "Model could not identify a food from the image.".to_string(),
            ));
        }
        tracing::info!(label = %food_query, "identified food from image");

        // 4. Search the nutrition database for candidates
        let results = self
            .nutrition_db
            .search_foods(food_query.clone(), SEARCH_PAGE_SIZE)
            .await?;
        if results.total_hits == 0 || results.foods.is_empty() {
            return Err(CoreError::NoMatch(format!(
                "No USDA matches for '{food_query}'"
            )));
        }

        // The index → identifier mapping must keep exactly this order; the
        // model answers by index, not by identifier.
        let mut indexes = Vec::new();
        let mut options = Vec::new();
        for food in results.foods.iter().take(MAX_CANDIDATES) {
            indexes.push(food.fdc_id);
            options.push(match &food.brand_owner {
                Some(brand) => format!("{} | Brand: {}", food.description, brand),
                None => food.description.clone(),
            });
        }

        // 5. Ask the model to choose ONE index from the numbered list
        let numbered = options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("{i}: {option}"))
            .collect::<Vec<_>>()
            .join("\n");
        let raw = self
            .vision_client
            .generate_with_image(
                format!("{numbered}\n{SELECT_CANDIDATE_PROMPT}"),
                image,
                SamplingConfig::LABELING,
            )
            .await?;
        let raw = raw.trim();
        let idx = find_candidate_index(raw).ok_or_else(|| {
            CoreError::InvalidModelResponse(format!("Invalid index from model: '{raw}'"))
        })?;
        if idx >= indexes.len() {
            return Err(CoreError::InvalidModelResponse(format!(
                "Index out of range: {idx}"
            )));
        }

        // 6. Fetch the chosen record and trim its nutrient list
        let record = self.nutrition_db.get_food(indexes[idx]).await?;
        let nutrients = pick_nutrients(&record.nutrients);

        // 7. Optionally ask the coach for a healthier recipe
        let coach = if self.coach_enabled {
            Some(self.recommend(&food_query, &record, &nutrients).await?)
        } else {
            None
        };

        Ok(ImageNutritionReport {
            detected_label: food_query,
            fdc_id: record.fdc_id,
            description: record.description,
            brand_owner: record.brand_owner,
            brand_name: record.brand_name,
            category: record.category,
            food_class: record.food_class,
            serving_size: record.serving_size,
            serving_unit: record.serving_unit,
            ingredients: record.ingredients,
            nutrients,
            coach,
        })
    }
}

impl<V, N> Service<V, N>
where
    V: VisionModelClient,
    N: NutritionDatabase,
{
    async fn recommend(
        &self,
        detected_label: &str,
        record: &FoodRecord,
        nutrients: &[NutrientEntry],
    ) -> Result<CoachRecommendation, CoreError> {
        let food_view = json!({
            "fdc_id": record.fdc_id,
            "description": record.description,
            "brand_owner": record.brand_owner,
            "brand_name": record.brand_name,
            "category": record.category,
            "class": record.food_class,
            "serving_size": record.serving_size,
            "serving_unit": record.serving_unit,
            "ingredients": record.ingredients,
            "nutrients": nutrients,
        });

        let raw = self
            .vision_client
            .generate_json_with_text(
                coach_prompt(detected_label, &food_view),
                SamplingConfig::COACHING,
                coach_recommendation_schema(),
            )
            .await?;

        let cleaned = strip_json_fences(&raw);
        serde_json::from_str(cleaned.trim()).map_err(|e| {
            tracing::error!("Failed to parse coach recommendation: {}", e);
            CoreError::RecommendationParse(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::image_nutrition::entities::{FoodNutrient, FoodSearchPage, FoodSummary};
    use crate::domain::image_nutrition::value_objects::ImageHandle;

    #[derive(Clone, Default)]
    struct FakeVision {
        label_reply: String,
        choice_reply: String,
        coach_reply: Option<String>,
        uploads: Arc<Mutex<Vec<PathBuf>>>,
        prompts: Arc<Mutex<Vec<String>>>,
        image_calls: Arc<AtomicUsize>,
    }

    impl VisionModelClient for FakeVision {
        async fn upload_image(
            &self,
            path: PathBuf,
            mime_type: String,
        ) -> Result<ImageHandle, CoreError> {
            assert!(path.exists(), "upload expects the temp file on disk");
            self.uploads.lock().unwrap().push(path);
            Ok(ImageHandle {
                uri: "files/test".to_string(),
                mime_type,
            })
        }

        async fn generate_with_image(
            &self,
            prompt: String,
            _image: ImageHandle,
            _sampling: SamplingConfig,
        ) -> Result<String, CoreError> {
            let call = self.image_calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt);
            Ok(if call == 0 {
                self.label_reply.clone()
            } else {
                self.choice_reply.clone()
            })
        }

        async fn generate_json_with_text(
            &self,
            prompt: String,
            _sampling: SamplingConfig,
            _response_schema: serde_json::Value,
        ) -> Result<String, CoreError> {
            self.prompts.lock().unwrap().push(prompt);
            Ok(self.coach_reply.clone().expect("coach reply not configured"))
        }
    }

    #[derive(Clone)]
    struct FakeNutrition {
        page: FoodSearchPage,
        record: Option<FoodRecord>,
        search_calls: Arc<AtomicUsize>,
        fetched: Arc<Mutex<Vec<u64>>>,
    }

    impl Default for FakeNutrition {
        fn default() -> Self {
            Self {
                page: FoodSearchPage {
                    total_hits: 0,
                    foods: Vec::new(),
                },
                record: None,
                search_calls: Arc::default(),
                fetched: Arc::default(),
            }
        }
    }

    impl NutritionDatabase for FakeNutrition {
        async fn search_foods(
            &self,
            _query: String,
            page_size: u32,
        ) -> Result<FoodSearchPage, CoreError> {
            assert_eq!(page_size, 200);
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.page.clone())
        }

        async fn get_food(&self, fdc_id: u64) -> Result<FoodRecord, CoreError> {
            self.fetched.lock().unwrap().push(fdc_id);
            self.record
                .clone()
                .ok_or_else(|| CoreError::ExternalServiceError("no record configured".to_string()))
        }
    }

    fn upload(content_type: Option<&str>) -> AnalyzeImageInput {
        AnalyzeImageInput {
            image_data: vec![0xFF, 0xD8, 0xFF, 0xE0],
            content_type: content_type.map(str::to_string),
        }
    }

    fn summary(fdc_id: u64, description: &str, brand_owner: Option<&str>) -> FoodSummary {
        FoodSummary {
            fdc_id,
            description: description.to_string(),
            brand_owner: brand_owner.map(str::to_string),
        }
    }

    fn cheddar_page() -> FoodSearchPage {
        FoodSearchPage {
            total_hits: 2,
            foods: vec![
                summary(1001, "Cheddar cheese", None),
                summary(1002, "Cheddar cheese, sharp", Some("Tillamook")),
            ],
        }
    }

    fn cheddar_record(fdc_id: u64) -> FoodRecord {
        FoodRecord {
            fdc_id,
            description: Some("Cheddar cheese, sharp".to_string()),
            brand_owner: Some("Tillamook".to_string()),
            brand_name: Some("Sharp Cheddar".to_string()),
            category: Some("Cheese".to_string()),
            food_class: Some("Branded".to_string()),
            serving_size: Some(28.0),
            serving_unit: Some("g".to_string()),
            ingredients: Some("Cultured milk, salt, enzymes".to_string()),
            nutrients: vec![
                FoodNutrient {
                    name: Some("Energy".to_string()),
                    amount: Some(402.0),
                    unit: Some("kcal".to_string()),
                },
                FoodNutrient {
                    name: Some("Protein".to_string()),
                    amount: Some(23.0),
                    unit: Some("g".to_string()),
                },
                FoodNutrient {
                    name: None,
                    amount: Some(1.0),
                    unit: None,
                },
                FoodNutrient {
                    name: Some("Calcium, Ca".to_string()),
                    amount: Some(710.0),
                    unit: Some("mg".to_string()),
                },
            ],
        }
    }

    fn coach_json() -> String {
        serde_json::json!({
            "title": "Cheddar veggie omelette",
            "why_better": "More protein and fiber for fewer calories",
            "servings": 2,
            "macros_per_serving": {
                "kcal": 320.0, "protein_g": 24.0, "carbs_g": 8.0, "fat_g": 21.0,
                "fiber_g": 3.0, "sodium_mg": 480.0, "sugar_g": 2.0
            },
            "ingredients": ["2 eggs", "30 g sharp cheddar", "handful of spinach"],
            "steps": ["Whisk the eggs", "Cook with spinach, fold in cheese"],
            "prep_time_min": 5,
            "cook_time_min": 10,
            "dietary_swaps": ["Use egg whites to cut fat"]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_rejects_non_image_content_type_without_external_calls() {
        let vision = FakeVision::default();
        let nutrition = FakeNutrition::default();
        let probe_vision = vision.clone();
        let probe_nutrition = nutrition.clone();
        let service = Service::new(vision, nutrition, false);

        let err = service.analyze_image(upload(Some("text/plain"))).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert!(probe_vision.uploads.lock().unwrap().is_empty());
        assert_eq!(probe_nutrition.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejects_missing_content_type() {
        let service = Service::new(FakeVision::default(), FakeNutrition::default(), false);
        let err = service.analyze_image(upload(None)).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_blank_label_is_no_food_detected_and_skips_database() {
        let vision = FakeVision {
            label_reply: "  \n\t ".to_string(),
            ..Default::default()
        };
        let nutrition = FakeNutrition::default();
        let probe_nutrition = nutrition.clone();
        let service = Service::new(vision, nutrition, false);

        let err = service.analyze_image(upload(Some("image/png"))).await.unwrap_err();
        assert!(matches!(err, CoreError::NoFoodDetected(_)));
        assert_eq!(probe_nutrition.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_hits_is_no_match_and_skips_second_model_call() {
        let vision = FakeVision {
            label_reply: "dragon fruit".to_string(),
            ..Default::default()
        };
        let probe_vision = vision.clone();
        let service = Service::new(vision, FakeNutrition::default(), false);

        let err = service.analyze_image(upload(Some("image/png"))).await.unwrap_err();
        match err {
            CoreError::NoMatch(detail) => assert!(detail.contains("dragon fruit")),
            other => panic!("expected NoMatch, got {other:?}"),
        }
        assert_eq!(probe_vision.image_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_positive_hit_count_with_empty_list_is_no_match() {
        let vision = FakeVision {
            label_reply: "cheddar".to_string(),
            ..Default::default()
        };
        let nutrition = FakeNutrition {
            page: FoodSearchPage {
                total_hits: 7,
                foods: Vec::new(),
            },
            ..Default::default()
        };
        let service = Service::new(vision, nutrition, false);

        let err = service.analyze_image(upload(Some("image/png"))).await.unwrap_err();
        assert!(matches!(err, CoreError::NoMatch(_)));
    }

    #[tokio::test]
    async fn test_digitless_choice_is_invalid_model_response() {
        let vision = FakeVision {
            label_reply: "cheddar cheese".to_string(),
            choice_reply: "the second one".to_string(),
            ..Default::default()
        };
        let nutrition = FakeNutrition {
            page: cheddar_page(),
            ..Default::default()
        };
        let probe_nutrition = nutrition.clone();
        let service = Service::new(vision, nutrition, false);

        let err = service.analyze_image(upload(Some("image/png"))).await.unwrap_err();
        match err {
            CoreError::InvalidModelResponse(detail) => {
                assert!(detail.contains("the second one"));
            }
            other => panic!("expected InvalidModelResponse, got {other:?}"),
        }
        assert!(probe_nutrition.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_choice_is_invalid_model_response() {
        let vision = FakeVision {
            label_reply: "cheddar cheese".to_string(),
            choice_reply: "7".to_string(),
            ..Default::default()
        };
        let nutrition = FakeNutrition {
            page: cheddar_page(),
            ..Default::default()
        };
        let service = Service::new(vision, nutrition, false);

        let err = service.analyze_image(upload(Some("image/png"))).await.unwrap_err();
        match err {
            CoreError::InvalidModelResponse(detail) => {
                assert!(detail.contains("out of range"));
                assert!(detail.contains('7'));
            }
            other => panic!("expected InvalidModelResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_happy_path_without_coach() {
        let vision = FakeVision {
            label_reply: " Tillamook sharp cheddar \n".to_string(),
            choice_reply: "The best match is 1.".to_string(),
            ..Default::default()
        };
        let nutrition = FakeNutrition {
            page: cheddar_page(),
            record: Some(cheddar_record(1002)),
            ..Default::default()
        };
        let probe_vision = vision.clone();
        let probe_nutrition = nutrition.clone();
        let service = Service::new(vision, nutrition, false);

        let report = service.analyze_image(upload(Some("image/jpeg"))).await.unwrap();

        assert_eq!(report.detected_label, "Tillamook sharp cheddar");
        assert_eq!(report.fdc_id, 1002);
        assert_eq!(report.brand_owner.as_deref(), Some("Tillamook"));
        assert_eq!(report.food_class.as_deref(), Some("Branded"));
        assert!(report.coach.is_none());

        // Unnamed nutrient dropped, the rest kept in source order.
        let names: Vec<&str> = report.nutrients.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["Energy", "Protein", "Calcium, Ca"]);

        assert_eq!(*probe_nutrition.fetched.lock().unwrap(), vec![1002]);
        assert_eq!(probe_vision.image_calls.load(Ordering::SeqCst), 2);

        let prompts = probe_vision.prompts.lock().unwrap();
        assert!(prompts[1].contains("0: Cheddar cheese"));
        assert!(prompts[1].contains("1: Cheddar cheese, sharp | Brand: Tillamook"));
        assert!(prompts[1].contains("Return ONLY the number"));
    }

    #[tokio::test]
    async fn test_candidate_list_is_capped_at_fifty() {
        let foods: Vec<FoodSummary> = (0u64..60)
            .map(|i| summary(2000 + i, &format!("Cheddar variant {i}"), None))
            .collect();
        let vision = FakeVision {
            label_reply: "cheddar".to_string(),
            choice_reply: "49".to_string(),
            ..Default::default()
        };
        let nutrition = FakeNutrition {
            page: FoodSearchPage {
                total_hits: 60,
                foods,
            },
            record: Some(cheddar_record(2049)),
            ..Default::default()
        };
        let probe_vision = vision.clone();
        let probe_nutrition = nutrition.clone();
        let service = Service::new(vision, nutrition, false);

        let report = service.analyze_image(upload(Some("image/png"))).await.unwrap();
        assert_eq!(report.fdc_id, 2049);
        assert_eq!(*probe_nutrition.fetched.lock().unwrap(), vec![2049]);

        let prompts = probe_vision.prompts.lock().unwrap();
        assert!(prompts[1].contains("49: Cheddar variant 49"));
        assert!(!prompts[1].contains("50: Cheddar variant 50"));
    }

    #[tokio::test]
    async fn test_happy_path_with_fenced_coach_reply() {
        let vision = FakeVision {
            label_reply: "sharp cheddar".to_string(),
            choice_reply: "1".to_string(),
            coach_reply: Some(format!("```json\n{}\n```", coach_json())),
            ..Default::default()
        };
        let nutrition = FakeNutrition {
            page: cheddar_page(),
            record: Some(cheddar_record(1002)),
            ..Default::default()
        };
        let probe_vision = vision.clone();
        let service = Service::new(vision, nutrition, true);

        let report = service.analyze_image(upload(Some("image/jpeg"))).await.unwrap();
        let coach = report.coach.expect("coach recommendation expected");
        assert_eq!(coach.title, "Cheddar veggie omelette");
        assert_eq!(coach.servings, 2);
        assert_eq!(coach.macros_per_serving.sodium_mg, Some(480.0));
        assert_eq!(coach.ingredients.len(), 3);

        // The coach prompt embeds the label and the trimmed record view.
        let prompts = probe_vision.prompts.lock().unwrap();
        let last_prompt = prompts.last().unwrap();
        assert!(last_prompt.contains("sharp cheddar"));
        assert!(last_prompt.contains("\"fdc_id\":1002"));
        assert!(last_prompt.contains("STRICT JSON"));
    }

    #[tokio::test]
    async fn test_unparseable_coach_reply_is_recommendation_parse_error() {
        let vision = FakeVision {
            label_reply: "sharp cheddar".to_string(),
            choice_reply: "0".to_string(),
            coach_reply: Some("Here is a tasty idea: omelette!".to_string()),
            ..Default::default()
        };
        let nutrition = FakeNutrition {
            page: cheddar_page(),
            record: Some(cheddar_record(1001)),
            ..Default::default()
        };
        let service = Service::new(vision, nutrition, true);

        let err = service.analyze_image(upload(Some("image/jpeg"))).await.unwrap_err();
        assert!(matches!(err, CoreError::RecommendationParse(_)));
    }

    #[tokio::test]
    async fn test_temp_file_removed_after_success() {
        let vision = FakeVision {
            label_reply: "cheddar".to_string(),
            choice_reply: "0".to_string(),
            ..Default::default()
        };
        let nutrition = FakeNutrition {
            page: cheddar_page(),
            record: Some(cheddar_record(1001)),
            ..Default::default()
        };
        let probe_vision = vision.clone();
        let service = Service::new(vision, nutrition, false);

        service.analyze_image(upload(Some("image/jpeg"))).await.unwrap();

        let uploads = probe_vision.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].extension().and_then(|e| e.to_str()), Some("jpg"));
        assert!(!uploads[0].exists(), "temp file must be gone after the request");
    }

    #[tokio::test]
    async fn test_temp_file_removed_after_error() {
        let vision = FakeVision {
            label_reply: "cheddar".to_string(),
            choice_reply: "no digits here".to_string(),
            ..Default::default()
        };
        let nutrition = FakeNutrition {
            page: cheddar_page(),
            ..Default::default()
        };
        let probe_vision = vision.clone();
        let service = Service::new(vision, nutrition, false);

        service.analyze_image(upload(Some("image/png"))).await.unwrap_err();

        let uploads = probe_vision.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].extension().and_then(|e| e.to_str()), Some("png"));
        assert!(!uploads[0].exists(), "temp file must be gone after the request");
    }
}
