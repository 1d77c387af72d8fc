//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`OpsflowError`] via `#[from]` at the port boundary.

/// Top-level error returned by ports and services.
#[derive(Debug, thiserror::Error)]
pub enum OpsflowError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The requested record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The backing store failed or is unreachable.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A rule was given an empty name.
    #[error("name must not be empty")]
    EmptyName,

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A stored timestamp could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
