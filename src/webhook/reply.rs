//! User-facing reply text.

use rust_decimal::Decimal;

use crate::extract::{DraftRecord, HabitStatus};

pub fn login_prompt() -> String {
    "You're not logged in. Send `login <email> <password>` to link your account, \
     or `help` to see what I can do."
        .to_string()
}

pub fn save_failed() -> String {
    "Sorry, I couldn't save that right now. Please try again in a bit.".to_string()
}

pub fn generic_error() -> String {
    "Something went wrong on my end. Please try again.".to_string()
}

/// Confirmation for a saved record, summarizing what was understood.
pub fn confirmation(draft: &DraftRecord) -> String {
    match draft {
        DraftRecord::Expense {
            amount,
            currency,
            vendor,
            category,
            ..
        } => match amount {
            Some(amount) => format!(
                "Logged expense: {} {} at {} ({}).",
                currency,
                format_amount(amount),
                vendor,
                category
            ),
            None => format!(
                "Logged expense at {vendor}, but I couldn't find an amount, \
                 so I've flagged it for review."
            ),
        },
        DraftRecord::Food {
            meal_type,
            description,
            calories,
        } => {
            let mut reply = format!("Logged {}: {}.", meal_label(meal_type), description);
            if let Some(calories) = calories {
                reply.push_str(&format!(" (~{calories} kcal)"));
            }
            reply
        }
        DraftRecord::Habit {
            habit_name,
            status,
            duration_minutes,
        } => {
            let verb = match status {
                HabitStatus::Completed => "completed",
                HabitStatus::Skipped => "skipped",
            };
            match duration_minutes {
                Some(minutes) => format!("Habit {verb}: {habit_name} ({minutes} min)."),
                None => format!("Habit {verb}: {habit_name}."),
            }
        }
        DraftRecord::Journal { mood, .. } => {
            format!("Journal entry saved (mood: {}).", mood_label(mood))
        }
    }
}

fn format_amount(amount: &Decimal) -> String {
    amount.normalize().to_string()
}

fn mood_label(mood: &crate::extract::Mood) -> &'static str {
    use crate::extract::Mood;
    match mood {
        Mood::Excellent => "excellent",
        Mood::Good => "good",
        Mood::Neutral => "neutral",
        Mood::Bad => "bad",
        Mood::Terrible => "terrible",
    }
}

fn meal_label(meal: &crate::extract::MealType) -> &'static str {
    match meal {
        crate::extract::MealType::Breakfast => "breakfast",
        crate::extract::MealType::Lunch => "lunch",
        crate::extract::MealType::Dinner => "dinner",
        crate::extract::MealType::Snack => "snack",
    }
}
