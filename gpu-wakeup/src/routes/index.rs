//! The operator page.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use crate::AppState;

/// GET / - served without the secret; the page asks for it client-side.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.index_page.clone())
}
