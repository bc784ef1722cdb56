//! HTTP routes.

pub mod gpu;
pub mod index;

use axum::http::StatusCode;

/// Fallback for unknown paths (only reached with a valid secret).
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}
