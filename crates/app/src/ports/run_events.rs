//! Run event port: lifecycle notifications for observers.

use std::future::Future;

use opsflow_domain::error::OpsflowError;
use opsflow_domain::run::RunEvent;

/// Publishes run lifecycle events to interested subscribers.
pub trait RunEventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: RunEvent) -> impl Future<Output = Result<(), OpsflowError>> + Send;
}

impl<T: RunEventPublisher + Send + Sync> RunEventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: RunEvent) -> impl Future<Output = Result<(), OpsflowError>> + Send {
        (**self).publish(event)
    }
}
