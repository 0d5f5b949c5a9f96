use std::sync::LazyLock;

use regex::Regex;

use crate::domain::image_nutrition::entities::{FoodNutrient, NutrientEntry};

/// Nutrient names always kept in the trimmed output, spelled the way the
/// nutrition database reports them.
pub const PRIORITY_NUTRIENTS: [&str; 7] = [
    "Energy",
    "Protein",
    "Total lipid (fat)",
    "Carbohydrate, by difference",
    "Sugars, total including NLEA",
    "Fiber, total dietary",
    "Sodium, Na",
];

/// Combined cap on the trimmed nutrient list.
const MAX_NUTRIENT_ENTRIES: usize = 12;

fn is_priority(name: &str) -> bool {
    PRIORITY_NUTRIENTS.contains(&name)
}

/// Trims a record's nutrient list for presentation: every priority-named
/// nutrient is kept; the remaining slots up to 12 entries go to
/// non-priority nutrients first-come in source order. Unnamed entries are
/// skipped. Output order is source order, never sorted.
pub fn pick_nutrients(nutrients: &[FoodNutrient]) -> Vec<NutrientEntry> {
    let priority_present = nutrients
        .iter()
        .filter(|n| n.name.as_deref().is_some_and(is_priority))
        .count();
    let extra_slots = MAX_NUTRIENT_ENTRIES.saturating_sub(priority_present);

    let mut out = Vec::new();
    let mut extras = 0;
    for nutrient in nutrients {
        let Some(name) = nutrient.name.as_deref() else {
            continue;
        };
        if !is_priority(name) {
            if extras >= extra_slots {
                continue;
            }
            extras += 1;
        }
        out.push(NutrientEntry {
            name: name.to_string(),
            amount: nutrient.amount,
            unit: nutrient.unit.clone(),
        });
    }
    out
}

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern"));

/// Extracts the first run of decimal digits anywhere in the model's reply
/// as a candidate index. The model may wrap the number in prose or
/// punctuation, so strict integer parsing would be too brittle. A run too
/// large for `usize` is treated as absent; the caller range-checks the rest.
pub fn find_candidate_index(text: &str) -> Option<usize> {
    DIGIT_RUN.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Removes a wrapping markdown code fence from a model reply: lines whose
/// trimmed content starts with ``` are dropped, as is any line that is
/// exactly the language tag "json" (case-insensitive). The remainder is
/// expected to be plain JSON.
pub fn strip_json_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("```") && !trimmed.eq_ignore_ascii_case("json")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, amount: f64) -> FoodNutrient {
        FoodNutrient {
            name: Some(name.to_string()),
            amount: Some(amount),
            unit: Some("g".to_string()),
        }
    }

    #[test]
    fn test_pick_nutrients_caps_at_twelve() {
        let mut list = vec![
            named("Energy", 100.0),
            named("Protein", 5.0),
            named("Sodium, Na", 200.0),
        ];
        for i in 0..20 {
            list.push(named(&format!("Vitamin {i}"), i as f64));
        }

        let picked = pick_nutrients(&list);
        assert_eq!(picked.len(), 12);
        assert_eq!(picked[0].name, "Energy");
        assert_eq!(picked[1].name, "Protein");
        assert_eq!(picked[2].name, "Sodium, Na");
        assert_eq!(picked[3].name, "Vitamin 0");
        assert_eq!(picked[11].name, "Vitamin 8");
    }

    #[test]
    fn test_pick_nutrients_priority_position_independent() {
        let mut list: Vec<FoodNutrient> =
            (0..20).map(|i| named(&format!("Vitamin {i}"), i as f64)).collect();
        list.push(named("Energy", 100.0));
        list.push(named("Protein", 5.0));
        list.push(named("Sodium, Na", 200.0));

        let picked = pick_nutrients(&list);
        assert_eq!(picked.len(), 12);
        let names: Vec<&str> = picked.iter().map(|n| n.name.as_str()).collect();
        assert!(names.contains(&"Energy"));
        assert!(names.contains(&"Protein"));
        assert!(names.contains(&"Sodium, Na"));
        assert_eq!(names[8], "Vitamin 8");
        assert!(!names.contains(&"Vitamin 9"));
        // Source order preserved: trailing priority entries stay trailing.
        assert_eq!(names[9..], ["Energy", "Protein", "Sodium, Na"]);
    }

    #[test]
    fn test_pick_nutrients_skips_unnamed() {
        let list = vec![
            FoodNutrient {
                name: None,
                amount: Some(1.0),
                unit: None,
            },
            named("Protein", 5.0),
        ];
        let picked = pick_nutrients(&list);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "Protein");
    }

    #[test]
    fn test_pick_nutrients_short_list_kept_whole() {
        let list = vec![named("Energy", 100.0), named("Zinc, Zn", 1.0)];
        assert_eq!(pick_nutrients(&list).len(), 2);
    }

    #[test]
    fn test_find_candidate_index_bare_number() {
        assert_eq!(find_candidate_index("7"), Some(7));
    }

    #[test]
    fn test_find_candidate_index_wrapped_in_prose() {
        assert_eq!(find_candidate_index("The best match is 12."), Some(12));
        assert_eq!(find_candidate_index("**3**"), Some(3));
        assert_eq!(find_candidate_index("index: 0\n"), Some(0));
    }

    #[test]
    fn test_find_candidate_index_no_digits() {
        assert_eq!(find_candidate_index("the second one"), None);
        assert_eq!(find_candidate_index(""), None);
    }

    #[test]
    fn test_find_candidate_index_first_run_wins() {
        assert_eq!(find_candidate_index("2 or maybe 14"), Some(2));
    }

    #[test]
    fn test_find_candidate_index_overflow_is_absent() {
        assert_eq!(find_candidate_index("99999999999999999999999999"), None);
    }

    #[test]
    fn test_strip_json_fences_fenced_with_tag() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_json_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_json_fences_uppercase_tag_line() {
        let raw = "```\nJSON\n{\"a\": 1}\n```\n";
        assert_eq!(strip_json_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_json_fences_plain_json_untouched() {
        let raw = "{\n  \"title\": \"x\"\n}";
        assert_eq!(strip_json_fences(raw), raw);
    }
}
