//! # opsflow-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the storage port traits defined in `opsflow-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//! - Queue action invocations in an outbox for an external dispatcher
//!
//! ## Dependency rule
//! Depends on `opsflow-app` (for port traits) and `opsflow-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod codec;
pub mod error;
#[cfg(test)]
mod fixtures;
pub mod inactivity;
pub mod outbox;
pub mod pool;
pub mod record_store;
pub mod rule_repo;

pub use inactivity::SqliteInactivityDetector;
pub use outbox::{OutboxEntry, SqliteActionOutbox};
pub use pool::{Config, Database};
pub use record_store::SqliteRecordStore;
pub use rule_repo::SqliteRuleRepository;
