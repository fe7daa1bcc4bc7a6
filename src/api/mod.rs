//! HTTP handlers

pub mod dataset;
pub mod health;
pub mod model;
pub mod monitor;
pub mod panel;
pub mod simulate;
