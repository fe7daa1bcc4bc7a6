use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::features::FeatureVector;
use crate::logic::model::{RiskLevel, RiskVerdict};

/// Which stream produced a recorded row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleSource {
    Live,
    Simulated,
}

/// One training row: exactly the features the model saw, plus its answer.
/// The layout stamp makes rows from older feature versions detectable at
/// retraining time instead of silently polluting the set.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DatasetRecord {
    pub id: String,
    pub timestamp: u64,

    pub source: SampleSource,

    // Feature contract
    pub feature_version: u8,
    pub layout_hash: u32,
    pub features: Vec<f32>,

    // Model output
    pub probabilities: Vec<f32>,
    pub level: RiskLevel,
    pub confidence: f32,

    // Filled in later by a human for retraining
    pub user_label: Option<String>,
}

impl DatasetRecord {
    pub fn from_scoring(
        source: SampleSource,
        features: &FeatureVector,
        verdict: &RiskVerdict,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis() as u64,
            source,
            feature_version: features.version,
            layout_hash: features.layout_hash,
            features: features.values.to_vec(),
            probabilities: verdict.probabilities.to_vec(),
            level: verdict.level,
            confidence: verdict.confidence,
            user_label: None,
        }
    }
}
