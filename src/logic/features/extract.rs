//! Feature Extraction
//!
//! Turns the rolling window into the model's input vector. Runs after the
//! newest sample was appended, so "instant" values come from the window's
//! back and rolling statistics already include them.

use serde::{Deserialize, Serialize};

use super::vector::{FeatureVector, FeatureVectorBuilder};
use crate::logic::window::RollingWindow;

// ============================================================================
// INERTIA WEIGHTS
// ============================================================================

/// Weights for the thermal inertia blend. Tunable per deployment; the
/// defaults match what the classifier was trained with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InertiaWeights {
    pub load: f32,
    pub temp: f32,
}

impl Default for InertiaWeights {
    fn default() -> Self {
        Self {
            load: 0.6,
            temp: 0.4,
        }
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Sustained load blended with the current temperature. A high value means
/// accumulated heat that will not dissipate quickly even if instantaneous
/// load drops to idle.
pub fn thermal_inertia(rolling_avg_cpu: f32, instant_temp: f32, weights: &InertiaWeights) -> f32 {
    weights.load * rolling_avg_cpu + weights.temp * instant_temp
}

/// Build the feature vector from the current window state.
pub fn build(window: &RollingWindow, weights: &InertiaWeights) -> FeatureVector {
    let newest = match window.newest() {
        Some(s) => *s,
        None => return FeatureVector::new(),
    };

    let rolling_avg_cpu = window.avg_cpu();
    let inertia = thermal_inertia(rolling_avg_cpu, newest.temperature, weights);

    FeatureVectorBuilder::new()
        .instant_cpu(newest.cpu_percent)
        .instant_temp(newest.temperature)
        .rolling_avg_cpu(rolling_avg_cpu)
        .rolling_avg_temp(window.avg_temperature())
        .thermal_inertia(inertia)
        .temp_rate_of_change(window.temp_rate_of_change())
        .build()
}
