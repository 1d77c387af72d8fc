//! Run preview and submission handlers.
//!
//! HTTP is stateless, so each request prepares its own session: the
//! candidate preview shows what a run would target, and a run request
//! names the candidate to select, if any, by its key.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use opsflow_app::orchestrator::RunSession;
use opsflow_app::ports::{
    ActionExecutor, IdentityProvider, InactivityDetector, RecordStore, RuleRepository,
    RunEventPublisher,
};
use opsflow_domain::candidate::TargetCandidate;
use opsflow_domain::id::RuleId;
use opsflow_domain::report::{ExecutionReport, LogLine};
use opsflow_domain::rule::SelectionPolicy;
use opsflow_domain::run::RunState;

use super::parse_rule_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for submitting a run.
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    /// Key of the candidate to run against; omit to run against all.
    #[serde(default)]
    pub candidate: Option<String>,
}

/// Where a prepared or aborted run stands.
#[derive(Debug, Serialize)]
pub struct RunSnapshot {
    pub rule_id: RuleId,
    pub state: &'static str,
    pub selection: Option<&'static str>,
    pub can_execute: bool,
    pub candidates: Vec<TargetCandidate>,
    pub error: Option<String>,
    pub log: Vec<LogLine>,
}

impl From<&RunSession> for RunSnapshot {
    fn from(session: &RunSession) -> Self {
        Self {
            rule_id: session.rule_id(),
            state: session.state().name(),
            selection: session.selection_policy().map(policy_name),
            can_execute: session.can_execute(),
            candidates: session.state().candidates().to_vec(),
            error: session.failure().map(|err| err.to_string()),
            log: session.log().to_vec(),
        }
    }
}

fn policy_name(policy: SelectionPolicy) -> &'static str {
    match policy {
        SelectionPolicy::Required => "required",
        SelectionPolicy::Optional => "optional",
        SelectionPolicy::Unsupported => "unsupported",
    }
}

/// A run that reached a verdict.
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    pub state: &'static str,
    pub summary: String,
    pub report: ExecutionReport,
}

/// Possible responses from the candidates endpoint.
pub enum CandidatesResponse {
    Ok(Json<RunSnapshot>),
    Aborted(Json<RunSnapshot>),
}

impl IntoResponse for CandidatesResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Aborted(json) => (StatusCode::UNPROCESSABLE_ENTITY, json).into_response(),
        }
    }
}

/// Possible responses from the run endpoint.
pub enum RunResponse {
    Finished(Json<RunOutcome>),
    /// The run ended in a hard failure; the snapshot carries its log.
    Aborted(Json<RunSnapshot>),
}

impl IntoResponse for RunResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Finished(json) => json.into_response(),
            Self::Aborted(json) => (StatusCode::UNPROCESSABLE_ENTITY, json).into_response(),
        }
    }
}

fn finished(session: &RunSession) -> RunResponse {
    let report = session.report().clone();
    RunResponse::Finished(Json(RunOutcome {
        state: session.state().name(),
        summary: report.summary(),
        report,
    }))
}

/// `GET /api/rules/{id}/candidates`: resolve candidates without running.
pub async fn candidates<R, S, D, X, I, P>(
    State(state): State<AppState<R, S, D, X, I, P>>,
    Path(id): Path<String>,
) -> Result<CandidatesResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    S: RecordStore + Send + Sync + 'static,
    D: InactivityDetector + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
    P: RunEventPublisher + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    let session = state.orchestrator.prepare(rule_id).await;
    let snapshot = Json(RunSnapshot::from(&session));
    if session.failure().is_some() {
        return Ok(CandidatesResponse::Aborted(snapshot));
    }
    Ok(CandidatesResponse::Ok(snapshot))
}

/// `POST /api/rules/{id}/run`: prepare, select and execute a run.
///
/// Answers `409` when the trigger needs a candidate and none was given, and
/// `422` with the run log when the run ends in a hard failure.
pub async fn run<R, S, D, X, I, P>(
    State(state): State<AppState<R, S, D, X, I, P>>,
    Path(id): Path<String>,
    Json(req): Json<RunRequest>,
) -> Result<RunResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    S: RecordStore + Send + Sync + 'static,
    D: InactivityDetector + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
    P: RunEventPublisher + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    let mut session = state.orchestrator.prepare(rule_id).await;
    if session.failure().is_some() {
        return Ok(RunResponse::Aborted(Json(RunSnapshot::from(&session))));
    }
    if *session.state() == RunState::NoCandidates {
        return Ok(finished(&session));
    }
    if let Some(key) = req.candidate.as_deref() {
        session.select(key)?;
    }

    match state.orchestrator.execute(&mut session).await {
        Ok(_) => Ok(finished(&session)),
        Err(_) if session.failure().is_some() => {
            Ok(RunResponse::Aborted(Json(RunSnapshot::from(&session))))
        }
        Err(err) => Err(err.into()),
    }
}
