//! # opsflow-domain
//!
//! Pure domain model for the opsflow client-automation system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Rules** (trigger type + ordered action specs + run counters)
//! - Define **Records** (meetings, clients, projects as read from storage)
//! - Define **Candidates** (trigger-specific, display-ready targets of one run)
//! - Define **Payloads** (the bundle handed to one action invocation)
//! - Define **Reports** and **Run state** (log lines, counts, lifecycle events)
//! - Contain all invariant enforcement and pure domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod candidate;
pub mod payload;
pub mod record;
pub mod report;
pub mod rule;
pub mod run;
