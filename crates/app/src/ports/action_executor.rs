//! Action executor port: performs one action's side effect.

use std::future::Future;

use opsflow_domain::payload::ExecutionPayload;
use opsflow_domain::report::ActionOutcome;
use opsflow_domain::rule::ActionSpec;

/// The executor could not even attempt the action.
///
/// The orchestrator turns this into a failed result; it never aborts a run.
#[derive(Debug, thiserror::Error)]
#[error("action {action_type} failed: {reason}")]
pub struct ActionError {
    pub action_type: String,
    pub reason: String,
}

/// Executes one action against one payload.
///
/// `index` is the action's zero-based position in the rule's declared list;
/// identical specs at different positions are distinct steps. The payload is
/// borrowed immutably, so an executor cannot alter what the next action sees.
///
/// # Ordering
///
/// The orchestrator awaits each call to completion before starting the next
/// one. Whatever an executor has committed by the time its future resolves is
/// visible to every later action of the same run.
pub trait ActionExecutor {
    fn execute(
        &self,
        index: usize,
        action: &ActionSpec,
        payload: &ExecutionPayload,
    ) -> impl Future<Output = Result<ActionOutcome, ActionError>> + Send;
}

impl<T: ActionExecutor + Send + Sync> ActionExecutor for std::sync::Arc<T> {
    fn execute(
        &self,
        index: usize,
        action: &ActionSpec,
        payload: &ExecutionPayload,
    ) -> impl Future<Output = Result<ActionOutcome, ActionError>> + Send {
        (**self).execute(index, action, payload)
    }
}
