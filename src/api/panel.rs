//! Demo panel handler

use axum::response::Html;

/// Self-contained control panel, embedded at compile time so the binary
/// ships with its own UI.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/panel.html"))
}
