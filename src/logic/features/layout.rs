//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The classifier artifact was trained against this exact ordering. The
//! rules are simple and absolute:
//! 1. Add feature -> increment FEATURE_VERSION and retrain
//! 2. Change order -> increment FEATURE_VERSION and retrain
//! 3. Remove feature -> increment FEATURE_VERSION and retrain
//!
//! The layout hash travels with every feature vector and every dataset
//! row, so a stale artifact or replayed data is caught at runtime instead
//! of silently scoring garbage.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in the exact order they appear in the vector
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Instantaneous (0-1) ===
    "instant_cpu",          // 0: Current CPU utilization percent
    "instant_temp",         // 1: Current temperature in degrees C

    // === Rolling statistics (2-3) ===
    "rolling_avg_cpu",      // 2: Mean CPU over the window
    "rolling_avg_temp",     // 3: Mean temperature over the window

    // === Derived (4-5) ===
    "thermal_inertia",      // 4: Sustained load blended with current temp
    "temp_rate_of_change",  // 5: Signed degrees C per second across the window
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 6;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of the canonical layout descriptor, e.g.
/// `v1:instant_cpu,instant_temp,...`. Any rename, reorder, addition, or
/// version bump moves the hash.
fn derive_hash(version: u8, names: &[&str]) -> u32 {
    let descriptor = format!("v{}:{}", version, names.join(","));
    crc32fast::hash(descriptor.as_bytes())
}

static LAYOUT_HASH: Lazy<u32> = Lazy::new(|| derive_hash(FEATURE_VERSION, FEATURE_LAYOUT));

/// Hash of the current layout (computed once, inputs are const)
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for the model status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

#[derive(Debug, Clone, Error)]
#[error(
    "feature layout mismatch: expected v{expected_version} (hash {expected_hash:08x}), \
     got v{actual_version} (hash {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Check incoming data (a vector, a dataset row) against the current layout.
pub fn validate_layout(
    incoming_version: u8,
    incoming_hash: u32,
) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 6);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_stable_and_non_zero() {
        assert_eq!(layout_hash(), layout_hash());
        assert_eq!(layout_hash(), derive_hash(FEATURE_VERSION, FEATURE_LAYOUT));
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_hash_moves_with_version() {
        assert_ne!(
            derive_hash(FEATURE_VERSION, FEATURE_LAYOUT),
            derive_hash(FEATURE_VERSION + 1, FEATURE_LAYOUT)
        );
    }

    #[test]
    fn test_hash_moves_with_rename_and_reorder() {
        let renamed = &["instant_cpu_pct", "instant_temp"];
        let original = &["instant_cpu", "instant_temp"];
        let swapped = &["instant_temp", "instant_cpu"];

        assert_ne!(derive_hash(1, original), derive_hash(1, renamed));
        assert_ne!(derive_hash(1, original), derive_hash(1, swapped));
    }

    #[test]
    fn test_validate_layout_success() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
    }

    #[test]
    fn test_validate_layout_version_mismatch() {
        assert!(validate_layout(FEATURE_VERSION + 1, layout_hash()).is_err());
    }

    #[test]
    fn test_validate_layout_hash_mismatch() {
        let err = validate_layout(FEATURE_VERSION, layout_hash().wrapping_add(1)).unwrap_err();
        assert_eq!(err.expected_version, FEATURE_VERSION);
        assert!(err.to_string().contains("feature layout mismatch"));
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("instant_cpu"), Some(0));
        assert_eq!(feature_index("thermal_inertia"), Some(4));
        assert_eq!(feature_index("temp_rate_of_change"), Some(5));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(feature_name(0), Some("instant_cpu"));
        assert_eq!(feature_name(5), Some("temp_rate_of_change"));
        assert_eq!(feature_name(100), None);
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_count, FEATURE_COUNT);
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
    }
}
