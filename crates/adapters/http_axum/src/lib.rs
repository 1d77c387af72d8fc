//! # opsflow-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for rule management (`/api/rules`, toggle)
//! - Preview the candidates of a run and submit runs
//!   (`/api/rules/{id}/candidates`, `/api/rules/{id}/run`)
//! - Stream run lifecycle events over SSE (`/api/runs/stream`)
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `opsflow-app` (for port traits, services and the orchestrator)
//! and `opsflow-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
