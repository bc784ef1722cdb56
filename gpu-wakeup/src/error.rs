//! Error type for the GPU endpoints.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gpu_wakeup_common::{ApiResponse, StatusData};

use crate::instance::InstanceError;

/// Errors surfaced by the GPU route handlers.
///
/// All variants map to `500 {success:false, message}`; the page shows the message
/// for any non-401 failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidInstance(#[from] InstanceError),

    #[error("malformed query string: {0}")]
    MalformedQuery(String),

    #[error("operation aborted: {0}")]
    Aborted(String),
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::MalformedQuery(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body: ApiResponse<StatusData> = ApiResponse::failure(self.to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_error_message_passes_through() {
        let err = Error::from(InstanceError::OutOfRange { from: 1, to: 4 });
        assert_eq!(err.to_string(), "top-server only has 1-4 instance");
    }

    #[test]
    fn test_every_error_is_500() {
        let errors = [
            Error::from(InstanceError::NotANumber),
            Error::MalformedQuery("bad".to_string()),
            Error::Aborted("task panicked".to_string()),
        ];
        for err in errors {
            assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
