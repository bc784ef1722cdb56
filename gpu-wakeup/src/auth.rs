//! Shared-secret gate.
//!
//! Every request except `GET /` (and `HEAD /`) must carry `pass=<secret>` in its query string.

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::client::ClientIp;
use crate::notify::Notification;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
struct PassQuery {
    pass: Option<String>,
}

/// Routes reachable without the secret: the page at `/`, by GET or HEAD.
fn is_public(method: &Method, path: &str) -> bool {
    (method == Method::GET || method == Method::HEAD) && path == "/"
}

/// Extract `pass` from the query string. Undecodable query strings count as missing.
fn pass_from(request: &Request) -> Option<String> {
    Query::<PassQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(q)| q.pass)
}

/// Middleware that rejects requests whose `pass` does not equal the secret.
pub async fn require_secret(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if is_public(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let pass = pass_from(&request);
    let auth = &state.config.auth;
    if auth.accepts(pass.as_deref()) {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let ClientIp(ip) =
        ClientIp::resolve(request.headers(), request.extensions(), &auth.client_ip_header);
    tracing::warn!(path = %path, client_ip = %ip, "rejected request with wrong secret");

    if !auth.is_quiet(&path) {
        let body = format!("IP: {}\nPW: {}", ip, pass.as_deref().unwrap_or("(none)"));
        state
            .notifier
            .dispatch(Notification::new("Unauthorized access to GPU manager", body));
    }

    (StatusCode::UNAUTHORIZED, "unauthorized request").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_root_get_is_public() {
        assert!(is_public(&Method::GET, "/"));
        assert!(is_public(&Method::HEAD, "/"));
        assert!(!is_public(&Method::HEAD, "/get-gpu-status"));
        assert!(!is_public(&Method::POST, "/"));
        assert!(!is_public(&Method::GET, "/get-gpu-status"));
        assert!(!is_public(&Method::GET, "/favicon.ico"));
    }

    #[test]
    fn test_pass_from_query() {
        let request = axum::http::Request::builder()
            .uri("/get-gpu-status?no=1&pass=s%20ecret")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(pass_from(&request).as_deref(), Some("s ecret"));

        let request = axum::http::Request::builder()
            .uri("/get-gpu-status?no=1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(pass_from(&request), None);
    }
}
