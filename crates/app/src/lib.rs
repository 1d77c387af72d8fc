//! # opsflow-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `RuleRepository`: CRUD and run counters for automation rules
//!   - `RecordStore`: read access to meetings, clients, projects, invoices
//!   - `InactivityDetector`: per-client inactivity signals
//!   - `ActionExecutor`: performs one action for one payload
//!   - `IdentityProvider`: the signed-in user
//!   - `RunEventPublisher`: run lifecycle notifications
//! - Resolve trigger candidates, build payloads and orchestrate runs
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `opsflow-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod enricher;
pub mod event_bus;
pub mod orchestrator;
pub mod payload_builder;
pub mod ports;
pub mod recorder;
pub mod services;
pub mod trigger_resolver;
