//! Risk Verdict Types
//!
//! Pure data plus the argmax mapping from class probabilities.

use serde::{Deserialize, Serialize};

// ============================================================================
// RISK CLASSIFICATION
// ============================================================================

/// Number of classes the artifact was trained with, in this order:
/// Normal = 0, Warning = 1, Critical = 2.
pub const CLASS_COUNT: usize = 3;

/// Risk classification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Thermal behavior inside the normal envelope
    Normal,
    /// Elevated trajectory, worth watching
    Warning,
    /// Runaway signature, act now
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Normal => "normal",
            RiskLevel::Warning => "warning",
            RiskLevel::Critical => "critical",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            RiskLevel::Normal => 0,
            RiskLevel::Warning => 1,
            RiskLevel::Critical => 2,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Normal => "#10b981",   // Green
            RiskLevel::Warning => "#f59e0b",  // Yellow
            RiskLevel::Critical => "#ef4444", // Red
        }
    }

    pub fn from_class_index(index: usize) -> Option<RiskLevel> {
        match index {
            0 => Some(RiskLevel::Normal),
            1 => Some(RiskLevel::Warning),
            2 => Some(RiskLevel::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RISK VERDICT
// ============================================================================

/// Result of scoring one feature vector. Not persisted as state; the
/// dataset recorder keeps training rows, not verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub level: RiskLevel,
    /// Probability of the winning class, clamped to [0, 1]
    pub confidence: f32,
    /// Full distribution in class order
    pub probabilities: [f32; CLASS_COUNT],
}

impl RiskVerdict {
    /// Argmax over the class distribution. Ties keep the lower severity.
    pub fn from_probabilities(probabilities: [f32; CLASS_COUNT]) -> Self {
        let mut winner = 0;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[winner] {
                winner = i;
            }
        }

        let level = RiskLevel::from_class_index(winner).unwrap_or(RiskLevel::Critical);

        Self {
            level,
            confidence: probabilities[winner].clamp(0.0, 1.0),
            probabilities,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_each_class() {
        let normal = RiskVerdict::from_probabilities([0.8, 0.15, 0.05]);
        assert_eq!(normal.level, RiskLevel::Normal);
        assert!((normal.confidence - 0.8).abs() < 1e-6);

        let warning = RiskVerdict::from_probabilities([0.2, 0.5, 0.3]);
        assert_eq!(warning.level, RiskLevel::Warning);

        let critical = RiskVerdict::from_probabilities([0.1, 0.2, 0.7]);
        assert_eq!(critical.level, RiskLevel::Critical);
        assert!((critical.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_tie_keeps_lower_severity() {
        let verdict = RiskVerdict::from_probabilities([0.4, 0.4, 0.2]);
        assert_eq!(verdict.level, RiskLevel::Normal);
    }

    #[test]
    fn test_confidence_clamped() {
        let verdict = RiskVerdict::from_probabilities([0.0, 0.0, 1.2]);
        assert_eq!(verdict.level, RiskLevel::Critical);
        assert_eq!(verdict.confidence, 1.0);
    }

    #[test]
    fn test_severity_and_colors() {
        assert!(RiskLevel::Normal.severity_level() < RiskLevel::Warning.severity_level());
        assert!(RiskLevel::Warning.severity_level() < RiskLevel::Critical.severity_level());
        assert_eq!(RiskLevel::Normal.color(), "#10b981");
        assert_eq!(RiskLevel::Warning.color(), "#f59e0b");
        assert_eq!(RiskLevel::Critical.color(), "#ef4444");
    }

    #[test]
    fn test_class_index_mapping() {
        assert_eq!(RiskLevel::from_class_index(0), Some(RiskLevel::Normal));
        assert_eq!(RiskLevel::from_class_index(2), Some(RiskLevel::Critical));
        assert_eq!(RiskLevel::from_class_index(3), None);
    }

    #[test]
    fn test_level_wire_format() {
        // The panel matches on these exact strings.
        let json = serde_json::to_value(RiskLevel::Critical).unwrap();
        assert_eq!(json, serde_json::json!("Critical"));
    }
}
