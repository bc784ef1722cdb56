//! GPU Wakeup - password-gated HTTP endpoint to inspect and restart GPU containers.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod exec;
pub mod gpu;
pub mod instance;
pub mod logging;
pub mod notify;
pub mod page;
pub mod routes;
pub mod test_util;

pub use config::Config;
pub use exec::{CommandResult, CommandRunner, ShellRunner};
pub use gpu::GpuOperations;
pub use instance::{InstanceError, InstanceId, InstanceRange};
pub use notify::{LogNotifier, Notification, Notifier, NotifierHandle, NotifyError, PushNotifier};

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub gpu: GpuOperations,
    pub notifier: NotifierHandle,
    /// Operator page, rendered once at startup.
    pub index_page: String,
}

impl AppState {
    pub fn new(
        config: Config,
        runner: Arc<dyn CommandRunner>,
        notifier: NotifierHandle,
    ) -> Result<Self, InstanceError> {
        let gpu = GpuOperations::new(&config.instances, &config.commands, runner)?;
        let index_page = page::render_index(&gpu);
        Ok(Self {
            config,
            gpu,
            notifier,
            index_page,
        })
    }
}

/// Build the full application router.
///
/// The secret gate wraps every route and the fallback; it lets `GET /` through.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index::index))
        .merge(routes::gpu::router())
        .fallback(routes::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_secret))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(logging::make_span)
                .on_response(logging::on_response),
        )
        .with_state(state)
}
