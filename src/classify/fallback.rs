//! Deterministic fallback rules.
//!
//! Used when the primary backend times out, errors, or returns a
//! low-confidence result. Pure and synchronous — no network, no added
//! latency. Rules are evaluated in a fixed priority order; journal is the
//! terminal default, so every input classifies.

use regex::Regex;

use crate::classify::types::{ClassificationResult, RecordKind};

/// A single fallback rule with a compiled regex.
struct Rule {
    kind: RecordKind,
    regex: Regex,
    confidence: f32,
    reasoning: &'static str,
}

/// Ordered rule list. First match wins.
pub struct FallbackRules {
    rules: Vec<Rule>,
}

/// Confidence assigned to the journal default.
const DEFAULT_CONFIDENCE: f32 = 0.5;

impl FallbackRules {
    /// Build the standard rule set, in priority order:
    /// currency ⇒ expense, meal vocabulary ⇒ food, completion/skip/exercise
    /// vocabulary ⇒ habit.
    pub fn standard() -> Self {
        let rules = vec![
            Rule {
                kind: RecordKind::Expense,
                regex: Regex::new(
                    r"(?i)([$₹€£¥]\s*\d|\d\s*(rs|rupees|inr|usd|eur|gbp|dollars?|bucks)\b|\b(spent|paid|bought|cost|bill)\b)",
                )
                .unwrap(),
                confidence: 0.85,
                reasoning: "currency symbol or spending word",
            },
            Rule {
                kind: RecordKind::Food,
                regex: Regex::new(
                    r"(?i)\b(ate|eating|eat|meal|breakfast|lunch|dinner|snack|brunch|hungry|drank|coffee|tea)\b",
                )
                .unwrap(),
                confidence: 0.8,
                reasoning: "eating or meal vocabulary",
            },
            Rule {
                kind: RecordKind::Habit,
                regex: Regex::new(
                    r"(?i)\b(done|completed|finished|skipped|skip|missed|streak|workout|exercise|gym|run|ran|jog|yoga|meditation|meditated|habit)\b",
                )
                .unwrap(),
                confidence: 0.75,
                reasoning: "completion, skip, or exercise vocabulary",
            },
        ];

        Self { rules }
    }

    /// Classify text. Total — always returns a result.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        for rule in &self.rules {
            if rule.regex.is_match(text) {
                return ClassificationResult::new(rule.kind, rule.confidence, rule.reasoning);
            }
        }
        // Unstructured text is always valid journal content.
        ClassificationResult::new(
            RecordKind::Journal,
            DEFAULT_CONFIDENCE,
            "no keyword match; journal is the default",
        )
    }
}

impl Default for FallbackRules {
    fn default() -> Self {
        Self::standard()
    }
}
