//! Server-Sent Events (SSE) stream of run lifecycle events.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use opsflow_app::ports::{
    ActionExecutor, IdentityProvider, InactivityDetector, RecordStore, RuleRepository,
    RunEventPublisher,
};

use crate::state::AppState;

/// `GET /api/runs/stream`: SSE stream of run events.
///
/// Each event is sent as a JSON `data:` frame named after its kind
/// (`candidates_resolved`, `log_line_appended`, `run_completed`,
/// `run_aborted`). The stream continues until the client disconnects.
pub async fn stream<R, S, D, X, I, P>(
    State(state): State<AppState<R, S, D, X, I, P>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    R: RuleRepository + Send + Sync + 'static,
    S: RecordStore + Send + Sync + 'static,
    D: InactivityDetector + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
    P: RunEventPublisher + Send + Sync + 'static,
{
    let event_rx = state.event_bus.subscribe();
    let event_stream = BroadcastStream::new(event_rx).filter_map(|result| match result {
        Ok(event) => match serde_json::to_value(&event) {
            Ok(json) => {
                let name = json
                    .get("event")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("run_event")
                    .to_string();
                Some(Ok(Event::default().event(name).data(json.to_string())))
            }
            Err(err) => {
                tracing::warn!(%err, "failed to serialize run event for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged, some run events were dropped");
            None
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use opsflow_app::ports::RunEventPublisher;
    use opsflow_domain::id::RuleId;
    use opsflow_domain::run::RunEvent;

    #[tokio::test]
    async fn should_subscribe_to_event_bus_when_stream_created() {
        let harness = test_support::Harness::new();
        let mut rx = harness.state.event_bus.subscribe();

        let _sse_response = stream(State(harness.state.clone())).await;

        let event = RunEvent::CandidatesResolved {
            rule_id: RuleId::new(),
            count: 3,
        };
        harness.state.event_bus.publish(event.clone()).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), event);
    }
}
