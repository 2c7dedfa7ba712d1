//! Habit field extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::extract::{DraftRecord, HabitStatus, strip_words};

static SKIPPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(skip|skipped|miss|missed|didn'?t)\b").unwrap());
static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(min(?:ute)?s?|h(?:ou)?rs?|hour)\b").unwrap()
});

/// Status and duration words, stripped from the habit name.
const FILLERS: &[&str] = &[
    "done", "completed", "complete", "finished", "skip", "skipped", "miss", "missed", "didn't",
    "didnt", "i", "my", "the", "today", "for",
];

/// Extract a habit draft. Never fails.
pub fn extract(text: &str) -> DraftRecord {
    let status = if SKIPPED.is_match(text) {
        HabitStatus::Skipped
    } else {
        HabitStatus::Completed
    };

    let duration_minutes = DURATION.captures(text).and_then(|caps| {
        let value: u32 = caps.get(1).unwrap().as_str().parse().ok()?;
        let unit = caps.get(2).unwrap().as_str().to_lowercase();
        Some(if unit.starts_with('h') {
            value * 60
        } else {
            value
        })
    });

    let without_duration = DURATION.replace(text, "");
    let habit_name = strip_words(&without_duration, FILLERS);
    let habit_name = if habit_name.is_empty() {
        "habit".to_string()
    } else {
        habit_name
    };

    DraftRecord::Habit {
        habit_name,
        status,
        duration_minutes,
    }
}
