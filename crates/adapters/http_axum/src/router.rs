//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use opsflow_app::ports::{
    ActionExecutor, IdentityProvider, InactivityDetector, RecordStore, RuleRepository,
    RunEventPublisher,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api`. Includes a [`TraceLayer`] that logs each
/// HTTP request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build<R, S, D, X, I, P>(state: AppState<R, S, D, X, I, P>) -> Router
where
    R: RuleRepository + Send + Sync + 'static,
    S: RecordStore + Send + Sync + 'static,
    D: InactivityDetector + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
    P: RunEventPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
