//! Classification result types.

use serde::{Deserialize, Serialize};

/// The record type a message maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Expense,
    Food,
    Habit,
    Journal,
}

impl RecordKind {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Food => "food",
            Self::Habit => "habit",
            Self::Journal => "journal",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(Self::Expense),
            "food" => Ok(Self::Food),
            "habit" => Ok(Self::Habit),
            "journal" => Ok(Self::Journal),
            other => Err(format!("unknown record kind: '{other}'")),
        }
    }
}

/// A classification decision. Transient — produced and consumed within one
/// webhook invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub kind: RecordKind,
    /// 0.0..=1.0.
    pub confidence: f32,
    /// Human-readable explanation, for logs only.
    pub reasoning: String,
}

impl ClassificationResult {
    pub fn new(kind: RecordKind, confidence: f32, reasoning: impl Into<String>) -> Self {
        Self {
            kind,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_roundtrip() {
        for kind in [
            RecordKind::Expense,
            RecordKind::Food,
            RecordKind::Habit,
            RecordKind::Journal,
        ] {
            assert_eq!(kind.label().parse::<RecordKind>().unwrap(), kind);
        }
        assert!("receipt".parse::<RecordKind>().is_err());
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(
            ClassificationResult::new(RecordKind::Journal, 1.7, "x").confidence,
            1.0
        );
        assert_eq!(
            ClassificationResult::new(RecordKind::Journal, -0.2, "x").confidence,
            0.0
        );
    }

    #[test]
    fn kind_serde_is_snake_case() {
        let json = serde_json::to_value(RecordKind::Expense).unwrap();
        assert_eq!(json, "expense");
    }
}
