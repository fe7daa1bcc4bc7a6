//! Raw Telemetry Sample
//!
//! The single unit of pipeline input: one timestamped reading of CPU load
//! and temperature. Validation lives here so every source (sliders, live
//! sensors, replayed data) is checked the same way before it can touch
//! window state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// VALIDATION BOUNDS
// ============================================================================

/// CPU utilization range (percent of total capacity)
pub const CPU_MIN: f32 = 0.0;
pub const CPU_MAX: f32 = 100.0;

/// Plausible sensor range, not silicon limits. Anything outside is a
/// broken reading, not a hot machine.
pub const TEMP_MIN_CELSIUS: f32 = -40.0;
pub const TEMP_MAX_CELSIUS: f32 = 150.0;

// ============================================================================
// RAW SAMPLE
// ============================================================================

/// One telemetry reading. Immutable once constructed; ownership moves into
/// the rolling window on ingest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f32,
    pub temperature: f32,
}

impl RawSample {
    pub fn new(timestamp: DateTime<Utc>, cpu_percent: f32, temperature: f32) -> Self {
        Self {
            timestamp,
            cpu_percent,
            temperature,
        }
    }

    /// Range and finiteness checks. Ordering against the stream is checked
    /// by the pipeline since it needs window state.
    pub fn validate(&self) -> Result<(), SampleError> {
        if !self.cpu_percent.is_finite() || !self.temperature.is_finite() {
            return Err(SampleError::NotFinite {
                cpu: self.cpu_percent,
                temperature: self.temperature,
            });
        }
        if self.cpu_percent < CPU_MIN || self.cpu_percent > CPU_MAX {
            return Err(SampleError::CpuOutOfRange(self.cpu_percent));
        }
        if self.temperature < TEMP_MIN_CELSIUS || self.temperature > TEMP_MAX_CELSIUS {
            return Err(SampleError::TemperatureOutOfRange(self.temperature));
        }
        Ok(())
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Why a sample was rejected. Rejected samples are logged and dropped;
/// they never reach the window.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("cpu_percent {0} outside [0, 100]")]
    CpuOutOfRange(f32),

    #[error("temperature {0}\u{b0}C outside plausible range [-40, 150]")]
    TemperatureOutOfRange(f32),

    #[error("non-finite reading (cpu: {cpu}, temperature: {temperature})")]
    NotFinite { cpu: f32, temperature: f32 },

    #[error("timestamp {got} is older than newest ingested sample {newest}")]
    NonMonotonic {
        newest: DateTime<Utc>,
        got: DateTime<Utc>,
    },
}

// ============================================================================
// TESTS
// ============================================================================
