//! Request logging hooks for `TraceLayer`.
//!
//! The query string carries the shared secret, so only the path is ever logged.

use std::time::Duration;

use axum::{body::Body, extract::Request, http::Response};
use tracing::Span;

/// Span that records method and path, never the query.
pub fn make_span(request: &Request) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path()
    )
}

/// One INFO event per completed request, inside the request span.
pub fn on_response(response: &Response<Body>, latency: Duration, _span: &Span) {
    tracing::info!(
        status = response.status().as_u16(),
        duration_ms = latency.as_millis() as u64,
        "HTTP request"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooks_run_without_subscriber() {
        let request = axum::http::Request::builder()
            .uri("/get-gpu-status?no=1&pass=hunter2")
            .body(Body::empty())
            .unwrap();
        let span = make_span(&request);
        // No subscriber is installed, so only check the span is usable.
        let _entered = span.enter();
        on_response(&Response::new(Body::empty()), Duration::from_millis(3), &span);
    }
}
