//! # opsflowd: opsflow daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the storage adapters behind the app ports
//! - Construct the rule service and the run orchestrator
//! - Build the axum router and serve until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;
mod identity;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use opsflow_adapter_http_axum::state::AppState;
use opsflow_adapter_storage_sqlite_sqlx::{
    Config as StorageConfig, SqliteActionOutbox, SqliteInactivityDetector, SqliteRecordStore,
    SqliteRuleRepository,
};
use opsflow_app::enricher::EntityEnricher;
use opsflow_app::event_bus::InProcessRunEventBus;
use opsflow_app::orchestrator::RunOrchestrator;
use opsflow_app::services::rule_service::RuleService;
use opsflow_app::trigger_resolver::TriggerResolver;

use crate::config::Config;
use crate::identity::StaticIdentity;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Adapters
    let rule_repo = Arc::new(SqliteRuleRepository::new(pool.clone()));
    let record_store = SqliteRecordStore::new(pool.clone());
    let detector = SqliteInactivityDetector::new(pool.clone());
    let outbox = SqliteActionOutbox::new(pool);
    let event_bus = Arc::new(InProcessRunEventBus::new(256));

    let identity = StaticIdentity::from_config(&config.identity)?;
    if !identity.is_signed_in() {
        tracing::warn!("no identity.user_id configured, every request is unauthenticated");
    }

    // Services
    let resolver = TriggerResolver::new(record_store, detector)
        .with_enricher(EntityEnricher::new(config.automation.display_offset()?))
        .with_meeting_window_days(config.automation.meeting_window_days)
        .with_inactivity(config.automation.inactivity());
    let orchestrator = RunOrchestrator::new(
        Arc::clone(&rule_repo),
        resolver,
        outbox,
        identity.clone(),
        Arc::clone(&event_bus),
    );
    let rule_service = RuleService::new(rule_repo);

    // HTTP
    let state = AppState::from_arcs(
        Arc::new(rule_service),
        Arc::new(orchestrator),
        Arc::new(identity),
        event_bus,
    );
    let app = opsflow_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "opsflowd listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("opsflowd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
