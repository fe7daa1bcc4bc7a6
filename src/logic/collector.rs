//! Sensor Reader - host telemetry via sysinfo
//!
//! CPU is the mean across logical cores. Temperature comes from the first
//! thermal component matching a preference list of common CPU sensors,
//! then any component, then a neutral fallback for hosts that expose
//! nothing readable (VMs, some laptops). Readings are clamped to the
//! valid sample range here so ordinary sensor jitter never trips the
//! pipeline's validation.

use chrono::Utc;
use sysinfo::{Components, System};

use crate::logic::sample::{RawSample, CPU_MAX, CPU_MIN, TEMP_MAX_CELSIUS, TEMP_MIN_CELSIUS};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Preferred temperature sensor labels, most trusted first.
const SENSOR_PREFERENCE: &[&str] = &["k10temp", "amdgpu", "coretemp", "acpitz"];

/// Reading used when the host exposes no thermal sensor at all.
pub const TEMPERATURE_FALLBACK: f32 = 50.0;

// ============================================================================
// SENSOR READER
// ============================================================================

pub struct SensorReader {
    system: System,
    components: Components,
    fallback_warned: bool,
}

impl SensorReader {
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_cpu();
        Self {
            system,
            components: Components::new_with_refreshed_list(),
            fallback_warned: false,
        }
    }

    /// Current CPU utilization percent, averaged over logical cores.
    /// sysinfo computes usage as a delta, so the first reading after
    /// construction may be low; the polling loop smooths that out.
    pub fn read_cpu_percent(&mut self) -> f32 {
        self.system.refresh_cpu();
        let cpus = self.system.cpus();
        if cpus.is_empty() {
            return 0.0;
        }
        let avg = cpus.iter().map(|c| c.cpu_usage()).sum::<f32>() / cpus.len() as f32;
        avg.clamp(CPU_MIN, CPU_MAX)
    }

    /// Current temperature in degrees C from the preferred sensor.
    pub fn read_temperature(&mut self) -> f32 {
        self.components.refresh();

        for wanted in SENSOR_PREFERENCE {
            let found = self.components.list().iter().find(|c| {
                c.label().to_lowercase().contains(wanted) && c.temperature().is_finite()
            });
            if let Some(component) = found {
                return component
                    .temperature()
                    .clamp(TEMP_MIN_CELSIUS, TEMP_MAX_CELSIUS);
            }
        }

        // No preferred sensor: take whatever reports a finite value.
        if let Some(component) = self
            .components
            .list()
            .iter()
            .find(|c| c.temperature().is_finite())
        {
            return component
                .temperature()
                .clamp(TEMP_MIN_CELSIUS, TEMP_MAX_CELSIUS);
        }

        if !self.fallback_warned {
            tracing::warn!(
                "No thermal sensor found, reporting a constant {}\u{b0}C",
                TEMPERATURE_FALLBACK
            );
            self.fallback_warned = true;
        }
        TEMPERATURE_FALLBACK
    }

    /// One full reading, stamped with the current time.
    pub fn read_sample(&mut self) -> RawSample {
        let cpu = self.read_cpu_percent();
        let temperature = self.read_temperature();
        RawSample::new(Utc::now(), cpu, temperature)
    }
}

impl Default for SensorReader {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readings_are_always_valid_samples() {
        let mut reader = SensorReader::new();
        // Whatever the host (bare metal, container, CI) reports, the
        // sample must pass pipeline validation.
        for _ in 0..3 {
            let sample = reader.read_sample();
            assert!(sample.validate().is_ok(), "sensor sample failed validation");
        }
    }

    #[test]
    fn test_cpu_within_bounds() {
        let mut reader = SensorReader::new();
        let cpu = reader.read_cpu_percent();
        assert!((CPU_MIN..=CPU_MAX).contains(&cpu));
    }
}
