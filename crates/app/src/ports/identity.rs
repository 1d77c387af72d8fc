//! Identity provider port.

use std::future::Future;

use opsflow_domain::payload::UserIdentity;

/// Resolves the authenticated caller, if any.
pub trait IdentityProvider {
    fn current_user(&self) -> impl Future<Output = Option<UserIdentity>> + Send;
}

impl<T: IdentityProvider + Send + Sync> IdentityProvider for std::sync::Arc<T> {
    fn current_user(&self) -> impl Future<Output = Option<UserIdentity>> + Send {
        (**self).current_user()
    }
}
