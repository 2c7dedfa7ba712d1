//! Food field extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::extract::{DraftRecord, MealType, strip_words};

static MEAL_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(breakfast|lunch|dinner)\b").unwrap());
static CALORIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:kcal|cal(?:orie)?s?)\b").unwrap());

/// Words carrying no food information, stripped from the description.
const FILLERS: &[&str] = &[
    "ate", "eat", "eating", "had", "have", "having", "i", "my", "some", "a", "an", "the", "for",
    "just", "this", "today", "breakfast", "lunch", "dinner", "snack",
];

/// Extract a food draft. Never fails.
pub fn extract(text: &str) -> DraftRecord {
    let meal_type = match MEAL_TYPE
        .captures(text)
        .map(|c| c.get(1).unwrap().as_str().to_lowercase())
        .as_deref()
    {
        Some("breakfast") => MealType::Breakfast,
        Some("lunch") => MealType::Lunch,
        Some("dinner") => MealType::Dinner,
        _ => MealType::Snack,
    };

    let calories = CALORIES
        .captures(text)
        .and_then(|c| c.get(1).unwrap().as_str().parse().ok());

    // Strip the calorie expression before word filtering so its number
    // doesn't leak into the description.
    let without_calories = CALORIES.replace(text, "");
    let description = strip_words(&without_calories, FILLERS);
    let description = if description.is_empty() {
        "food".to_string()
    } else {
        description
    };

    DraftRecord::Food {
        meal_type,
        description,
        calories,
    }
}
