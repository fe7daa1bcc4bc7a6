//! Features Module - schema and extraction
//!
//! `layout` owns the feature contract, `vector` the versioned container,
//! `extract` the math that fills it from a rolling window.

pub mod extract;
pub mod layout;
pub mod vector;


// Re-export common types
pub use extract::InertiaWeights;
pub use layout::{layout_hash, validate_layout, LayoutInfo, FEATURE_COUNT, FEATURE_VERSION};
pub use vector::FeatureVector;
