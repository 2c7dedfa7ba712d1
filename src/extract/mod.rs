//! Field extraction — text + classification → a structured draft record.
//!
//! One pure function per record type. Extractors never fail: every path
//! produces a best-effort record with explicit defaults, since downstream
//! record creation can always be corrected by the user.

pub mod expense;
pub mod food;
pub mod habit;
pub mod journal;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classify::types::RecordKind;

/// Meal slot for food records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// Outcome for habit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitStatus {
    Completed,
    Skipped,
}

/// Mood ladder for journal records, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Excellent,
    Good,
    Neutral,
    Bad,
    Terrible,
}

/// A structured, type-tagged extraction result, ready for handoff to the
/// record-creation service. Transient — lives within one webhook invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DraftRecord {
    Expense {
        /// None only on a classifier contract violation (no number in text);
        /// such records are flagged for manual review.
        amount: Option<Decimal>,
        currency: String,
        vendor: String,
        category: String,
        date: NaiveDate,
        needs_review: bool,
    },
    Food {
        meal_type: MealType,
        description: String,
        calories: Option<u32>,
    },
    Habit {
        habit_name: String,
        status: HabitStatus,
        duration_minutes: Option<u32>,
    },
    Journal {
        title: String,
        content: String,
        mood: Mood,
        journal_type: String,
    },
}

impl DraftRecord {
    /// The record kind of this draft.
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Expense { .. } => RecordKind::Expense,
            Self::Food { .. } => RecordKind::Food,
            Self::Habit { .. } => RecordKind::Habit,
            Self::Journal { .. } => RecordKind::Journal,
        }
    }
}

/// Run the extractor matching the classified kind.
pub fn extract(kind: RecordKind, text: &str, default_currency: &str) -> DraftRecord {
    match kind {
        RecordKind::Expense => expense::extract(text, default_currency),
        RecordKind::Food => food::extract(text),
        RecordKind::Habit => habit::extract(text),
        RecordKind::Journal => journal::extract(text),
    }
}

/// Drop tokens that are pure punctuation or appear in `stop_words`
/// (case-insensitive), preserving the order of what remains.
pub(crate) fn strip_words(text: &str, stop_words: &[&str]) -> String {
    text.split_whitespace()
        .filter(|token| {
            let bare = token.trim_matches(|c: char| !c.is_alphanumeric());
            !bare.is_empty() && !stop_words.iter().any(|w| bare.eq_ignore_ascii_case(w))
        })
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .collect::<Vec<_>>()
        .join(" ")
}
