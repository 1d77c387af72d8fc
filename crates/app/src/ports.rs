//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod action_executor;
pub mod identity;
pub mod inactivity;
pub mod record_store;
pub mod rule_repo;
pub mod run_events;

pub use action_executor::{ActionError, ActionExecutor};
pub use identity::IdentityProvider;
pub use inactivity::InactivityDetector;
pub use record_store::RecordStore;
pub use rule_repo::RuleRepository;
pub use run_events::RunEventPublisher;
