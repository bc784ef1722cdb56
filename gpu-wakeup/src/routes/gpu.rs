//! GPU status and reset endpoints.
//!
//! Each operation runs on its own task so a client hanging up mid-restart does
//! not cancel the follow-up status query or the notification.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use gpu_wakeup_common::{ApiResponse, StatusData};
use serde::Deserialize;

use crate::client::ClientIp;
use crate::error::{Error, Result};
use crate::instance::InstanceError;
use crate::notify::Notification;
use crate::AppState;

/// Build the GPU router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get-gpu-status", get(get_gpu_status))
        .route("/reset-instance", post(reset_instance))
}

#[derive(Debug, Deserialize)]
struct InstanceQuery {
    no: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Status,
    Reset,
}

impl Operation {
    fn title(self, no: &str) -> String {
        match self {
            Operation::Status => format!("Checked GPU status of instance {}", no),
            Operation::Reset => format!("Reset instance {}", no),
        }
    }
}

/// Validate, run and notify on a detached task, then wait for its output.
async fn run_detached(
    state: Arc<AppState>,
    operation: Operation,
    no: Option<String>,
    ip: String,
) -> Result<String> {
    let task = tokio::spawn(async move {
        let no = no.as_deref().map(str::trim);
        let stdout = match operation {
            Operation::Status => state.gpu.get_status(no).await?,
            Operation::Reset => state.gpu.reset_instance(no).await?,
        };

        let no = no.unwrap_or_default();
        tracing::info!(instance = no, client_ip = %ip, ?operation, "GPU operation finished");
        state.notifier.dispatch(Notification::new(
            operation.title(no),
            format!("IP: {}\nstdout: {}", ip, stdout),
        ));

        Ok::<_, InstanceError>(stdout)
    });

    let stdout = task.await.map_err(|e| Error::Aborted(e.to_string()))??;
    Ok(stdout)
}

/// GET /get-gpu-status?no=<n>&pass=<secret>
async fn get_gpu_status(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    query: std::result::Result<Query<InstanceQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<StatusData>>> {
    let Query(query) = query?;
    let stdout = run_detached(state, Operation::Status, query.no, ip).await?;
    Ok(Json(ApiResponse::ok(StatusData::new(stdout))))
}

/// POST /reset-instance?no=<n>&pass=<secret>
async fn reset_instance(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    query: std::result::Result<Query<InstanceQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<StatusData>>> {
    let Query(query) = query?;
    let stdout = run_detached(state, Operation::Reset, query.no, ip).await?;
    Ok(Json(ApiResponse::ok(StatusData::new(stdout))))
}
