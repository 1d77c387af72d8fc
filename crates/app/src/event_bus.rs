//! In-process run event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use opsflow_domain::error::OpsflowError;
use opsflow_domain::run::RunEvent;

use crate::ports::RunEventPublisher;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
pub struct InProcessRunEventBus {
    sender: broadcast::Sender<RunEvent>,
}

impl InProcessRunEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.sender.subscribe()
    }
}

impl RunEventPublisher for InProcessRunEventBus {
    fn publish(&self, event: RunEvent) -> impl Future<Output = Result<(), OpsflowError>> + Send {
        // send fails only when there are zero receivers
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}
