//! Inactivity detector port.

use std::future::Future;

use opsflow_domain::error::OpsflowError;
use opsflow_domain::id::UserId;
use opsflow_domain::record::{InactiveClientRecord, InactivityConfig};

/// Reports, per client of an owner, which inactivity signals are raised.
pub trait InactivityDetector {
    /// Evaluate every client of `owner_id` against `config`.
    ///
    /// Clients with no raised signal may be included; callers filter them.
    fn detect(
        &self,
        owner_id: UserId,
        config: &InactivityConfig,
    ) -> impl Future<Output = Result<Vec<InactiveClientRecord>, OpsflowError>> + Send;
}

impl<T: InactivityDetector + Send + Sync> InactivityDetector for std::sync::Arc<T> {
    fn detect(
        &self,
        owner_id: UserId,
        config: &InactivityConfig,
    ) -> impl Future<Output = Result<Vec<InactiveClientRecord>, OpsflowError>> + Send {
        (**self).detect(owner_id, config)
    }
}
