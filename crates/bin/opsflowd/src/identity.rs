//! Single-user identity provider backed by configuration.

use opsflow_app::ports::IdentityProvider;
use opsflow_domain::payload::UserIdentity;

use crate::config::{ConfigError, IdentityConfig};

/// Answers every request with the same configured user, or with nobody.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    user: Option<UserIdentity>,
}

impl StaticIdentity {
    /// Build from the `[identity]` section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when `user_id` is not a UUID.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, ConfigError> {
        let user = config.user_id()?.map(|id| UserIdentity {
            id,
            email: config.email().to_string(),
        });
        Ok(Self { user })
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Option<UserIdentity> {
        self.user.clone()
    }
}
