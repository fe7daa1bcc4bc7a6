//! Logic Module - Pipeline Engines
//!
//! Everything between a raw sensor reading and a risk verdict:
//!
//! - `sample` / `window` - Validated telemetry and the rolling time window
//! - `features/` - Feature extraction (instant, rolling, thermal inertia)
//! - `model/` - ONNX inference and verdict mapping
//! - `pipeline` - The ingest-to-verdict orchestrator
//! - `collector` / `monitor` - Host sensor polling loop
//! - `dataset/` - JSONL training data recorder

pub mod collector;
pub mod dataset;
pub mod features;
pub mod model;
pub mod monitor;
pub mod pipeline;
pub mod sample;
pub mod window;
