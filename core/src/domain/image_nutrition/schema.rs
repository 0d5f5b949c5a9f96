use serde_json::json;

/// Returns the JSON schema for coach recommendation LLM responses
pub fn coach_recommendation_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "why_better": { "type": "string" },
            "servings": { "type": "integer" },
            "macros_per_serving": {
                "type": "object",
                "properties": {
                    "kcal": { "type": "number" },
                    "protein_g": { "type": "number" },
                    "carbs_g": { "type": "number" },
                    "fat_g": { "type": "number" },
                    "fiber_g": { "type": "number" },
                    "sodium_mg": { "type": "number" },
                    "sugar_g": { "type": "number" }
                },
                "required": [
                    "kcal", "protein_g", "carbs_g", "fat_g", "fiber_g", "sodium_mg", "sugar_g"
                ]
            },
            "ingredients": { "type": "array", "items": { "type": "string" } },
            "steps": { "type": "array", "items": { "type": "string" } },
            "prep_time_min": { "type": "integer" },
            "cook_time_min": { "type": "integer" },
            "dietary_swaps": { "type": "array", "items": { "type": "string" } }
        },
        "required": [
            "title", "why_better", "servings", "macros_per_serving",
            "ingredients", "steps", "prep_time_min", "cook_time_min", "dietary_swaps"
        ]
    })
}
