//! Shared application state for axum handlers.

use std::sync::Arc;

use opsflow_app::event_bus::InProcessRunEventBus;
use opsflow_app::orchestrator::RunOrchestrator;
use opsflow_app::ports::{
    ActionExecutor, IdentityProvider, InactivityDetector, RecordStore, RuleRepository,
    RunEventPublisher,
};
use opsflow_app::services::rule_service::RuleService;

/// Application state shared across all axum handlers.
///
/// Generic over the rule repository, record store, inactivity detector,
/// action executor, identity provider and run event publisher to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<R, S, D, X, I, P> {
    /// Rule CRUD service.
    pub rule_service: Arc<RuleService<R>>,
    /// Drives rule runs.
    pub orchestrator: Arc<RunOrchestrator<R, S, D, X, I, P>>,
    /// Resolves the caller of each request.
    pub identity: Arc<I>,
    /// Source of the SSE run event stream.
    pub event_bus: Arc<InProcessRunEventBus>,
}

impl<R, S, D, X, I, P> Clone for AppState<R, S, D, X, I, P> {
    fn clone(&self) -> Self {
        Self {
            rule_service: Arc::clone(&self.rule_service),
            orchestrator: Arc::clone(&self.orchestrator),
            identity: Arc::clone(&self.identity),
            event_bus: Arc::clone(&self.event_bus),
        }
    }
}

impl<R, S, D, X, I, P> AppState<R, S, D, X, I, P>
where
    R: RuleRepository + Send + Sync + 'static,
    S: RecordStore + Send + Sync + 'static,
    D: InactivityDetector + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
    P: RunEventPublisher + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// The orchestrator usually shares its rule repository and identity
    /// provider with the service and the state, hence the `Arc`s.
    pub fn from_arcs(
        rule_service: Arc<RuleService<R>>,
        orchestrator: Arc<RunOrchestrator<R, S, D, X, I, P>>,
        identity: Arc<I>,
        event_bus: Arc<InProcessRunEventBus>,
    ) -> Self {
        Self {
            rule_service,
            orchestrator,
            identity,
            event_bus,
        }
    }
}
