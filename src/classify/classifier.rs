//! Composed classifier — primary backend with timeout, fallback rules as the
//! safety net.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::classify::backend::ClassifierBackend;
use crate::classify::fallback::FallbackRules;
use crate::classify::types::ClassificationResult;
use crate::config::BotConfig;
use crate::error::ClassifyError;

/// Classifier with a probabilistic primary path and a deterministic fallback.
///
/// The fallback runs on timeout, backend error, or a primary result below the
/// confidence threshold. Classification therefore never fails.
pub struct Classifier {
    backend: Arc<dyn ClassifierBackend>,
    fallback: FallbackRules,
    threshold: f32,
    timeout: Duration,
}

impl Classifier {
    pub fn new(backend: Arc<dyn ClassifierBackend>, config: &BotConfig) -> Self {
        Self {
            backend,
            fallback: FallbackRules::standard(),
            threshold: config.confidence_threshold,
            timeout: config.classifier_timeout,
        }
    }

    /// Classify a message. Total — every input yields a result.
    pub async fn classify(&self, text: &str) -> ClassificationResult {
        match tokio::time::timeout(self.timeout, self.backend.classify(text)).await {
            Ok(Ok(result)) if result.confidence >= self.threshold => {
                debug!(
                    kind = %result.kind,
                    confidence = result.confidence,
                    source = "primary",
                    reasoning = %result.reasoning,
                    "Classified"
                );
                result
            }
            Ok(Ok(low)) => {
                debug!(
                    kind = %low.kind,
                    confidence = low.confidence,
                    threshold = self.threshold,
                    "Primary classification below threshold; using fallback"
                );
                self.fall_back(text)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Classifier backend failed; using fallback");
                self.fall_back(text)
            }
            Err(_) => {
                warn!(
                    timeout = ?self.timeout,
                    error = %ClassifyError::Timeout(self.timeout),
                    "Classifier backend timed out; using fallback"
                );
                self.fall_back(text)
            }
        }
    }

    fn fall_back(&self, text: &str) -> ClassificationResult {
        let result = self.fallback.classify(text);
        debug!(
            kind = %result.kind,
            confidence = result.confidence,
            source = "fallback",
            reasoning = %result.reasoning,
            "Classified"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::types::RecordKind;
    use async_trait::async_trait;

    /// Mock backend with a scripted behavior.
    enum MockBackend {
        Fixed(RecordKind, f32),
        Failing,
        Hanging,
    }

    #[async_trait]
    impl ClassifierBackend for MockBackend {
        async fn classify(&self, _text: &str) -> Result<ClassificationResult, ClassifyError> {
            match self {
                Self::Fixed(kind, confidence) => {
                    Ok(ClassificationResult::new(*kind, *confidence, "mock"))
                }
                Self::Failing => Err(ClassifyError::RequestFailed("boom".into())),
                Self::Hanging => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!()
                }
            }
        }
    }

    fn make_classifier(backend: MockBackend) -> Classifier {
        let mut config = BotConfig::default();
        config.classifier_timeout = Duration::from_millis(50);
        Classifier::new(Arc::new(backend), &config)
    }

    #[tokio::test]
    async fn confident_primary_result_wins() {
        let classifier = make_classifier(MockBackend::Fixed(RecordKind::Food, 0.92));
        // Text the fallback would call expense — primary takes precedence.
        let result = classifier.classify("₹450 Uber").await;
        assert_eq!(result.kind, RecordKind::Food);
        assert_eq!(result.reasoning, "mock");
    }

    #[tokio::test]
    async fn low_confidence_falls_back() {
        let classifier = make_classifier(MockBackend::Fixed(RecordKind::Food, 0.4));
        let result = classifier.classify("₹450 Uber").await;
        assert_eq!(result.kind, RecordKind::Expense);
    }

    #[tokio::test]
    async fn threshold_is_inclusive() {
        let classifier = make_classifier(MockBackend::Fixed(RecordKind::Habit, 0.7));
        let result = classifier.classify("whatever").await;
        assert_eq!(result.kind, RecordKind::Habit);
    }

    #[tokio::test]
    async fn backend_error_falls_back() {
        let classifier = make_classifier(MockBackend::Failing);
        let result = classifier.classify("ate breakfast").await;
        assert_eq!(result.kind, RecordKind::Food);
    }

    #[tokio::test]
    async fn backend_timeout_falls_back() {
        let classifier = make_classifier(MockBackend::Hanging);
        let result = classifier.classify("meditation done").await;
        assert_eq!(result.kind, RecordKind::Habit);
    }

    #[tokio::test]
    async fn fallback_default_is_journal() {
        let classifier = make_classifier(MockBackend::Failing);
        let result = classifier.classify("thinking about the future").await;
        assert_eq!(result.kind, RecordKind::Journal);
    }
}
