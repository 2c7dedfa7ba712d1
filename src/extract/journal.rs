//! Journal field extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::extract::{DraftRecord, Mood};

/// Maximum title length in characters.
const TITLE_LENGTH: usize = 50;

/// Mood ladder, best to worst. First match in this order wins, so
/// "great day but tired" reads as good, not bad.
static MOOD_LADDER: LazyLock<Vec<(Mood, Regex)>> = LazyLock::new(|| {
    vec![
        (
            Mood::Excellent,
            Regex::new(r"(?i)\b(amazing|awesome|excellent|fantastic|wonderful|incredible)\b")
                .unwrap(),
        ),
        (
            Mood::Good,
            Regex::new(r"(?i)\b(good|great|happy|glad|nice|productive|grateful)\b").unwrap(),
        ),
        (
            Mood::Neutral,
            Regex::new(r"(?i)\b(okay|fine|alright|meh|normal)\b").unwrap(),
        ),
        (
            Mood::Bad,
            Regex::new(r"(?i)\b(bad|sad|tired|stressed|anxious|upset|frustrated|angry)\b")
                .unwrap(),
        ),
        (
            Mood::Terrible,
            Regex::new(r"(?i)\b(terrible|awful|horrible|depressed|miserable|worst)\b").unwrap(),
        ),
    ]
});

/// Topic keyword → journal type table. First match wins; "daily" is the default.
static TOPIC_KEYWORDS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (
            "gratitude",
            Regex::new(r"(?i)\b(grateful|thankful|gratitude|blessed)\b").unwrap(),
        ),
        (
            "work",
            Regex::new(r"(?i)\b(work|office|meeting|project|deadline|boss|colleague)\b").unwrap(),
        ),
        (
            "health",
            Regex::new(r"(?i)\b(health|doctor|sick|sleep|slept|pain|medicine)\b").unwrap(),
        ),
        (
            "relationship",
            Regex::new(r"(?i)\b(friend|family|partner|relationship|mom|dad|wife|husband)\b")
                .unwrap(),
        ),
    ]
});

/// Extract a journal draft. Never fails — content is the raw text verbatim.
pub fn extract(text: &str) -> DraftRecord {
    let mood = MOOD_LADDER
        .iter()
        .find(|(_, regex)| regex.is_match(text))
        .map(|(mood, _)| *mood)
        .unwrap_or(Mood::Neutral);

    let journal_type = TOPIC_KEYWORDS
        .iter()
        .find(|(_, regex)| regex.is_match(text))
        .map(|(topic, _)| *topic)
        .unwrap_or("daily");

    DraftRecord::Journal {
        title: text.chars().take(TITLE_LENGTH).collect(),
        content: text.to_string(),
        mood,
        journal_type: journal_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unwrap_journal(draft: DraftRecord) -> (String, String, Mood, String) {
        match draft {
            DraftRecord::Journal {
                title,
                content,
                mood,
                journal_type,
            } => (title, content, mood, journal_type),
            other => panic!("expected Journal, got {other:?}"),
        }
    }

    #[test]
    fn content_is_verbatim() {
        let text = "long day at the office, lots on my mind";
        let (_, content, _, journal_type) = unwrap_journal(extract(text));
        assert_eq!(content, text);
        assert_eq!(journal_type, "work");
    }

    #[test]
    fn title_is_first_fifty_chars() {
        let text = "x".repeat(120);
        let (title, content, _, _) = unwrap_journal(extract(&text));
        assert_eq!(title.chars().count(), 50);
        assert_eq!(content.chars().count(), 120);
    }

    #[test]
    fn title_respects_char_boundaries() {
        let text = "दिन बहुत अच्छा था ".repeat(10);
        let (title, _, _, _) = unwrap_journal(extract(&text));
        assert_eq!(title.chars().count(), 50);
    }

    #[test]
    fn mood_ladder_priority() {
        let (_, _, mood, _) = unwrap_journal(extract("a great day but so tired"));
        assert_eq!(mood, Mood::Good); // good outranks bad in the ladder

        let (_, _, mood, _) = unwrap_journal(extract("amazing but stressful"));
        assert_eq!(mood, Mood::Excellent);
    }

    #[test]
    fn mood_detection_per_rung() {
        for (text, expected) in [
            ("what a wonderful evening", Mood::Excellent),
            ("felt happy today", Mood::Good),
            ("it was fine I guess", Mood::Neutral),
            ("stressed about everything", Mood::Bad),
            ("honestly an awful week", Mood::Terrible),
        ] {
            let (_, _, mood, _) = unwrap_journal(extract(text));
            assert_eq!(mood, expected, "text: {text}");
        }
    }

    #[test]
    fn no_mood_keyword_is_neutral() {
        let (_, _, mood, _) = unwrap_journal(extract("went to the park"));
        assert_eq!(mood, Mood::Neutral);
    }

    #[test]
    fn topic_detection() {
        for (text, expected) in [
            ("so thankful for everything", "gratitude"),
            ("meeting ran late again", "work"),
            ("barely slept last night", "health"),
            ("dinner with family", "relationship"),
            ("went to the park", "daily"),
        ] {
            let (_, _, _, journal_type) = unwrap_journal(extract(text));
            assert_eq!(journal_type, expected, "text: {text}");
        }
    }
}
