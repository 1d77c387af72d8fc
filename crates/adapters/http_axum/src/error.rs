//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use opsflow_app::orchestrator::RunError;
use opsflow_domain::error::OpsflowError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`OpsflowError`] and [`RunError`] to an HTTP response with an
/// appropriate status code.
#[derive(Debug)]
pub enum ApiError {
    /// The request carries no authenticated caller.
    Unauthenticated,
    Opsflow(OpsflowError),
    Run(RunError),
}

impl From<OpsflowError> for ApiError {
    fn from(err: OpsflowError) -> Self {
        Self::Opsflow(err)
    }
}

impl From<RunError> for ApiError {
    fn from(err: RunError) -> Self {
        Self::Run(err)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "not signed in".to_string()),
            Self::Opsflow(OpsflowError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Opsflow(OpsflowError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Opsflow(OpsflowError::Storage(err)) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::Run(err) => (run_status(err), err.to_string()),
        }
    }
}

fn run_status(err: &RunError) -> StatusCode {
    match err {
        RunError::Unauthenticated => StatusCode::UNAUTHORIZED,
        RunError::SelectionRequired(_) | RunError::InvalidState(_) => StatusCode::CONFLICT,
        RunError::SelectionUnsupported(_) => StatusCode::BAD_REQUEST,
        RunError::UnknownCandidate(_) => StatusCode::NOT_FOUND,
        RunError::Configuration | RunError::RuleInactive | RunError::MalformedActions(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
