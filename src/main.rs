//! Thermal Sentinel
//!
//! Telemetry feature pipeline with ONNX risk scoring.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      THERMAL SENTINEL                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌────────────────┐   ┌──────────────────┐  │
//! │  │  Sensor   │   │  HTTP API      │   │  Demo Panel      │  │
//! │  │  Monitor  │   │  (Axum)        │   │  (embedded)      │  │
//! │  └─────┬─────┘   └───────┬────────┘   └────────┬─────────┘  │
//! │        │                 │ simulate             │            │
//! │        ▼                 ▼                      │            │
//! │  ┌──────────────────────────────┐               │            │
//! │  │  Pipeline                    │◄──────────────┘            │
//! │  │  window → features → model   │                            │
//! │  └─────┬──────────────────┬─────┘                            │
//! │        ▼                  ▼                                  │
//! │  ┌───────────┐     ┌────────────┐                            │
//! │  │  Dataset  │     │  ONNX      │                            │
//! │  │  (JSONL)  │     │  Session   │                            │
//! │  └───────────┘     └────────────┘                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod api;
mod config;
mod error;
mod logic;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use parking_lot::Mutex;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::logic::dataset::DatasetLogger;
use crate::logic::model::{OnnxClassifier, Scorer};
use crate::logic::monitor::LiveMonitor;
use crate::logic::pipeline::TelemetryPipeline;

pub use error::{ApiError, ApiResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "thermal_sentinel=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Thermal Sentinel starting...");

    // Load the model. A missing or bad artifact is not fatal at boot:
    // the server comes up and scoring returns ModelUnavailable until
    // a reload succeeds.
    let classifier = Arc::new(OnnxClassifier::unloaded());
    match classifier.load_from_file(
        Path::new(&config.model_path),
        config.model_sha256.as_deref(),
    ) {
        Ok(metadata) => {
            tracing::info!(
                "Model ready: {} ({} classes)",
                metadata.model_path,
                logic::model::CLASS_COUNT
            );
        }
        Err(e) => {
            tracing::warn!(
                "Model load failed: {}. Scoring will fail until /api/v1/model/reload succeeds.",
                e
            );
        }
    }
    let scorer: Arc<dyn Scorer> = classifier.clone();

    // Dataset recording
    let dataset = if config.dataset_enabled {
        Some(Arc::new(DatasetLogger::new(config.dataset_dir.clone())))
    } else {
        tracing::info!("Dataset recording disabled");
        None
    };

    // Simulation pipeline (driven by POST /api/v1/simulate)
    let simulation = Arc::new(Mutex::new(TelemetryPipeline::new(
        config.window_horizon_secs,
        config.inertia_weights(),
        scorer.clone(),
    )));

    // Live monitor (host sensor polling)
    let monitor = LiveMonitor::new(
        scorer,
        dataset.clone(),
        Duration::from_millis(config.poll_interval_ms),
        config.window_horizon_secs,
        config.inertia_weights(),
        config.monitor_history_cap,
    );

    if config.monitor_autostart {
        if let Err(e) = monitor.start() {
            tracing::warn!("Monitor autostart failed: {}", e);
        }
    }

    // Build application state
    let state = AppState {
        config: config.clone(),
        classifier,
        simulation,
        monitor,
        dataset,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub classifier: Arc<OnnxClassifier>,
    pub simulation: Arc<Mutex<TelemetryPipeline>>,
    pub monitor: LiveMonitor,
    pub dataset: Option<Arc<DatasetLogger>>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Panel and health (no version prefix)
    let root_routes = Router::new()
        .route("/", get(api::panel::index))
        .route("/health", get(api::health::check));

    // Scoring routes
    let scoring_routes = Router::new()
        .route("/api/v1/simulate", post(api::simulate::ingest))
        .route("/api/v1/simulate/reset", post(api::simulate::reset))
        .route("/api/v1/monitor", get(api::monitor::status))
        .route("/api/v1/monitor/start", post(api::monitor::start))
        .route("/api/v1/monitor/stop", post(api::monitor::stop))
        .route("/api/v1/monitor/history", get(api::monitor::history));

    // Model and dataset management
    let management_routes = Router::new()
        .route("/api/v1/model", get(api::model::status))
        .route("/api/v1/model/reload", post(api::model::reload))
        .route("/api/v1/dataset/stats", get(api::dataset::stats))
        .route("/api/v1/dataset/export", get(api::dataset::export));

    // Combine all routes
    Router::new()
        .merge(root_routes)
        .merge(scoring_routes)
        .merge(management_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
