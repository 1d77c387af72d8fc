//! JSON REST handlers for automation rules.
//!
//! Every handler is scoped to the authenticated caller: rules owned by
//! someone else are reported as not found.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use opsflow_app::ports::{
    ActionExecutor, IdentityProvider, InactivityDetector, RecordStore, RuleRepository,
    RunEventPublisher,
};
use opsflow_domain::id::UserId;
use opsflow_domain::rule::{AutomationRule, AutomationRuleBuilder, RawActions, TriggerType};

use super::{current_user, parse_rule_id};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating or replacing a rule.
///
/// `actions` is accepted either as a JSON list or as a string holding one;
/// it is only normalized when the rule runs.
#[derive(Deserialize)]
pub struct RuleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub actions: RawActions,
    pub is_active: Option<bool>,
}

impl RuleRequest {
    fn into_builder(self, owner_id: UserId) -> AutomationRuleBuilder {
        AutomationRule::builder()
            .name(self.name)
            .description(self.description)
            .trigger_type(self.trigger_type)
            .actions(self.actions)
            .is_active(self.is_active.unwrap_or(true))
            .owner_id(owner_id)
    }
}

/// Request body for switching a rule on or off.
#[derive(Deserialize)]
pub struct ToggleRequest {
    pub is_active: bool,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AutomationRule>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get, update and toggle endpoints.
pub enum GetResponse {
    Ok(Json<AutomationRule>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<AutomationRule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/rules`: list the caller's rules.
pub async fn list<R, S, D, X, I, P>(
    State(state): State<AppState<R, S, D, X, I, P>>,
) -> Result<ListResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    S: RecordStore + Send + Sync + 'static,
    D: InactivityDetector + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
    P: RunEventPublisher + Send + Sync + 'static,
{
    let user = current_user(state.identity.as_ref()).await?;
    let rules = state.rule_service.list_rules(user.id).await?;
    Ok(ListResponse::Ok(Json(rules)))
}

/// `GET /api/rules/{id}`: get one rule.
pub async fn get<R, S, D, X, I, P>(
    State(state): State<AppState<R, S, D, X, I, P>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    S: RecordStore + Send + Sync + 'static,
    D: InactivityDetector + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
    P: RunEventPublisher + Send + Sync + 'static,
{
    let user = current_user(state.identity.as_ref()).await?;
    let rule_id = parse_rule_id(&id)?;
    let rule = state.rule_service.get_rule(user.id, rule_id).await?;
    Ok(GetResponse::Ok(Json(rule)))
}

/// `POST /api/rules`: create a rule owned by the caller.
pub async fn create<R, S, D, X, I, P>(
    State(state): State<AppState<R, S, D, X, I, P>>,
    Json(req): Json<RuleRequest>,
) -> Result<CreateResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    S: RecordStore + Send + Sync + 'static,
    D: InactivityDetector + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
    P: RunEventPublisher + Send + Sync + 'static,
{
    let user = current_user(state.identity.as_ref()).await?;
    let rule = req.into_builder(user.id).build()?;
    let created = state.rule_service.create_rule(rule).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/rules/{id}`: replace the editable fields of a rule.
pub async fn update<R, S, D, X, I, P>(
    State(state): State<AppState<R, S, D, X, I, P>>,
    Path(id): Path<String>,
    Json(req): Json<RuleRequest>,
) -> Result<GetResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    S: RecordStore + Send + Sync + 'static,
    D: InactivityDetector + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
    P: RunEventPublisher + Send + Sync + 'static,
{
    let user = current_user(state.identity.as_ref()).await?;
    let rule_id = parse_rule_id(&id)?;
    let rule = req.into_builder(user.id).id(rule_id).build()?;
    let updated = state.rule_service.update_rule(user.id, rule).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `POST /api/rules/{id}/toggle`: switch a rule on or off.
pub async fn toggle<R, S, D, X, I, P>(
    State(state): State<AppState<R, S, D, X, I, P>>,
    Path(id): Path<String>,
    Json(req): Json<ToggleRequest>,
) -> Result<GetResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    S: RecordStore + Send + Sync + 'static,
    D: InactivityDetector + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
    P: RunEventPublisher + Send + Sync + 'static,
{
    let user = current_user(state.identity.as_ref()).await?;
    let rule_id = parse_rule_id(&id)?;
    let rule = state
        .rule_service
        .set_active(user.id, rule_id, req.is_active)
        .await?;
    Ok(GetResponse::Ok(Json(rule)))
}

/// `DELETE /api/rules/{id}`: delete a rule.
pub async fn delete<R, S, D, X, I, P>(
    State(state): State<AppState<R, S, D, X, I, P>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    S: RecordStore + Send + Sync + 'static,
    D: InactivityDetector + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
    P: RunEventPublisher + Send + Sync + 'static,
{
    let user = current_user(state.identity.as_ref()).await?;
    let rule_id = parse_rule_id(&id)?;
    state.rule_service.delete_rule(user.id, rule_id).await?;
    Ok(DeleteResponse::NoContent)
}
