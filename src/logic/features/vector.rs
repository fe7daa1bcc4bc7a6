//! Feature Vector - the classifier's input
//!
//! Versioned and hash-stamped so a vector built against one layout can
//! never be scored or recorded against another. Never pass a raw
//! `[f32; N]` around, use this. Vectors are immutable once built; the
//! builder is the only writer.

use serde::{Deserialize, Serialize};

use super::layout::{
    feature_index, layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT,
    FEATURE_VERSION,
};

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Feature values in FEATURE_LAYOUT order, stamped with layout metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Zeroed vector with the current version stamp.
    pub fn new() -> Self {
        Self::from_values([0.0; FEATURE_COUNT])
    }

    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        feature_index(name).and_then(|i| self.get(i))
    }

    /// Validate that this vector is compatible with the current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    pub fn is_compatible(&self) -> bool {
        self.validate().is_ok()
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[f32; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f32; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// One named setter per feature, so extraction code reads like the layout
/// definition. Features never written stay 0.0.
#[derive(Default)]
pub struct FeatureVectorBuilder {
    values: [f32; FEATURE_COUNT],
}

impl FeatureVectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(mut self, name: &str, value: f32) -> Self {
        if let Some(index) = feature_index(name) {
            self.values[index] = value;
        }
        self
    }

    pub fn instant_cpu(self, value: f32) -> Self {
        self.write("instant_cpu", value)
    }

    pub fn instant_temp(self, value: f32) -> Self {
        self.write("instant_temp", value)
    }

    pub fn rolling_avg_cpu(self, value: f32) -> Self {
        self.write("rolling_avg_cpu", value)
    }

    pub fn rolling_avg_temp(self, value: f32) -> Self {
        self.write("rolling_avg_temp", value)
    }

    pub fn thermal_inertia(self, value: f32) -> Self {
        self.write("thermal_inertia", value)
    }

    pub fn temp_rate_of_change(self, value: f32) -> Self {
        self.write("temp_rate_of_change", value)
    }

    pub fn build(self) -> FeatureVector {
        FeatureVector::from_values(self.values)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_new() {
        let vector = FeatureVector::new();
        assert_eq!(vector.version, FEATURE_VERSION);
        assert_eq!(vector.layout_hash, layout_hash());
        assert_eq!(vector.values, [0.0; FEATURE_COUNT]);
    }

    #[test]
    fn test_feature_vector_builder() {
        let vector = FeatureVectorBuilder::new()
            .instant_cpu(50.0)
            .instant_temp(62.5)
            .thermal_inertia(55.0)
            .build();

        assert_eq!(vector.get_by_name("instant_cpu"), Some(50.0));
        assert_eq!(vector.get_by_name("instant_temp"), Some(62.5));
        assert_eq!(vector.get_by_name("thermal_inertia"), Some(55.0));
        // Unset features default to zero.
        assert_eq!(vector.get_by_name("rolling_avg_cpu"), Some(0.0));
    }

    #[test]
    fn test_get_by_name_unknown_feature() {
        let vector = FeatureVector::from_values([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(vector.get_by_name("nonexistent"), None);
        assert_eq!(vector.get(100), None);
    }

    #[test]
    fn test_feature_vector_validation() {
        let vector = FeatureVector::new();
        assert!(vector.is_compatible());

        let stale = FeatureVector {
            version: FEATURE_VERSION + 1,
            ..FeatureVector::new()
        };
        assert!(stale.validate().is_err());
    }

    #[test]
    fn test_feature_vector_from_array() {
        let array = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let vector: FeatureVector = array.into();

        assert_eq!(vector.version, FEATURE_VERSION);
        assert_eq!(vector.values, array);
        assert_eq!(vector.as_slice(), &array);
    }
}
