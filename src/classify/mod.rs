//! Message classification — primary AI backend with a deterministic
//! rule-based fallback. No input is unclassifiable: journal is the universal
//! default.

pub mod backend;
pub mod classifier;
pub mod fallback;
pub mod types;

pub use backend::{ClassifierBackend, HttpClassifier};
pub use classifier::Classifier;
pub use fallback::FallbackRules;
pub use types::{ClassificationResult, RecordKind};
