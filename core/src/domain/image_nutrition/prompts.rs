/// Instruction for the first model call: one concise food label.
pub const IDENTIFY_FOOD_PROMPT: &str = "Describe the main food you see using as few words as \
     possible. Choose ONE specific item only (include brand if visible). Do NOT include sizes, \
     counts, or preparation descriptors.";

/// Instruction appended below the numbered candidate list for the second
/// model call. The model answers with an index, not an identifier.
pub const SELECT_CANDIDATE_PROMPT: &str = "From the numbered list, pick the ONE index that best \
     matches the image. Return ONLY the number. Consider brand text if any.";

/// Builds the coach prompt around the detected label and a trimmed JSON view
/// of the selected nutrition record.
pub fn coach_prompt(detected_label: &str, food_view: &serde_json::Value) -> String {
    format!(
        "You are a registered dietitian and meal coach. A user photographed this food: \
         {detected_label}.\n\
         Its nutrition database record:\n{food_view}\n\n\
         Propose ONE healthier recipe that uses this food as an ingredient. Respond with STRICT \
         JSON only, no prose and no markdown, exactly matching this shape:\n\
         {{\"title\": string, \"why_better\": string, \"servings\": integer, \
         \"macros_per_serving\": {{\"kcal\": number, \"protein_g\": number, \"carbs_g\": number, \
         \"fat_g\": number, \"fiber_g\": number, \"sodium_mg\": number, \"sugar_g\": number}}, \
         \"ingredients\": [string], \"steps\": [string], \"prep_time_min\": integer, \
         \"cook_time_min\": integer, \"dietary_swaps\": [string]}}"
    )
}
