//! Configuration module

use std::env;
use std::path::PathBuf;

use crate::logic::features::InertiaWeights;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Path to the ONNX model artifact
    pub model_path: String,

    /// Expected SHA-256 of the model file (hex). Empty or unset skips the check.
    pub model_sha256: Option<String>,

    /// Rolling window horizon in seconds
    pub window_horizon_secs: u64,

    /// Live monitor poll interval in milliseconds
    pub poll_interval_ms: u64,

    /// Thermal inertia blend weights
    pub inertia_load_weight: f32,
    pub inertia_temp_weight: f32,

    /// Start polling host sensors at boot
    pub monitor_autostart: bool,

    /// Snapshots kept for /api/v1/monitor/history
    pub monitor_history_cap: usize,

    /// Record scored samples to JSONL for retraining
    pub dataset_enabled: bool,

    /// Dataset directory override
    pub dataset_dir: PathBuf,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "models/thermal_runaway_rf.onnx".to_string()),

            model_sha256: env::var("MODEL_SHA256")
                .ok()
                .filter(|s| !s.trim().is_empty()),

            window_horizon_secs: env::var("WINDOW_HORIZON_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),

            poll_interval_ms: env::var("POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),

            inertia_load_weight: env::var("INERTIA_LOAD_WEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.6),

            inertia_temp_weight: env::var("INERTIA_TEMP_WEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.4),

            monitor_autostart: env::var("MONITOR_AUTOSTART")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),

            monitor_history_cap: env::var("MONITOR_HISTORY_CAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),

            dataset_enabled: env::var("DATASET_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),

            dataset_dir: env::var("DATASET_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_dataset_dir()),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn inertia_weights(&self) -> InertiaWeights {
        InertiaWeights {
            load: self.inertia_load_weight,
            temp: self.inertia_temp_weight,
        }
    }
}

fn default_dataset_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("thermal-sentinel")
        .join("dataset")
}
