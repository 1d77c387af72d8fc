//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod rules;
#[allow(clippy::missing_errors_doc)]
pub mod runs;
pub mod sse;

use std::str::FromStr;

use axum::Router;
use axum::routing::{get, post};

use opsflow_app::ports::{
    ActionExecutor, IdentityProvider, InactivityDetector, RecordStore, RuleRepository,
    RunEventPublisher,
};
use opsflow_domain::error::{OpsflowError, ValidationError};
use opsflow_domain::id::RuleId;
use opsflow_domain::payload::UserIdentity;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, S, D, X, I, P>() -> Router<AppState<R, S, D, X, I, P>>
where
    R: RuleRepository + Send + Sync + 'static,
    S: RecordStore + Send + Sync + 'static,
    D: InactivityDetector + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
    P: RunEventPublisher + Send + Sync + 'static,
{
    Router::new()
        // Rules
        .route(
            "/rules",
            get(rules::list::<R, S, D, X, I, P>).post(rules::create::<R, S, D, X, I, P>),
        )
        .route(
            "/rules/{id}",
            get(rules::get::<R, S, D, X, I, P>)
                .put(rules::update::<R, S, D, X, I, P>)
                .delete(rules::delete::<R, S, D, X, I, P>),
        )
        .route(
            "/rules/{id}/toggle",
            post(rules::toggle::<R, S, D, X, I, P>),
        )
        // Runs
        .route(
            "/rules/{id}/candidates",
            get(runs::candidates::<R, S, D, X, I, P>),
        )
        .route("/rules/{id}/run", post(runs::run::<R, S, D, X, I, P>))
        .route("/runs/stream", get(sse::stream::<R, S, D, X, I, P>))
}

/// The authenticated caller, or `401`.
pub(crate) async fn current_user<I: IdentityProvider>(
    identity: &I,
) -> Result<UserIdentity, ApiError> {
    identity
        .current_user()
        .await
        .ok_or(ApiError::Unauthenticated)
}

/// Parse a rule id from a path segment, or `400`.
pub(crate) fn parse_rule_id(raw: &str) -> Result<RuleId, ApiError> {
    RuleId::from_str(raw)
        .map_err(|_| OpsflowError::from(ValidationError::InvalidId(raw.to_string())).into())
}
