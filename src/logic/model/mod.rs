//! Model Module - classifier boundary
//!
//! The trained Random Forest is an opaque artifact; this module owns
//! loading it, checking its integrity, and scoring feature vectors.

pub mod classifier;
pub mod verdict;

// Re-export common types
pub use classifier::{ModelError, ModelStatus, OnnxClassifier, Scorer};
pub use verdict::{RiskLevel, RiskVerdict, CLASS_COUNT};
