//! In-memory port stubs and a wired state for handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, NaiveDate};
use http_body_util::BodyExt;
use tower::ServiceExt;

use opsflow_app::event_bus::InProcessRunEventBus;
use opsflow_app::orchestrator::RunOrchestrator;
use opsflow_app::ports::{
    ActionError, ActionExecutor, IdentityProvider, InactivityDetector, RecordStore,
    RuleRepository,
};
use opsflow_app::services::rule_service::RuleService;
use opsflow_app::trigger_resolver::TriggerResolver;
use opsflow_domain::error::OpsflowError;
use opsflow_domain::id::{ClientId, MeetingId, RuleId, UserId};
use opsflow_domain::payload::{ExecutionPayload, UserIdentity};
use opsflow_domain::record::{
    Client, ContactRef, InactiveClientRecord, InactivityConfig, Meeting, MeetingStatus, Project,
    ProjectStatus,
};
use opsflow_domain::report::ActionOutcome;
use opsflow_domain::rule::{ActionSpec, AutomationRule, TriggerType};
use opsflow_domain::time::{self, Timestamp};

use crate::state::AppState;

#[derive(Default)]
pub struct MemoryRules {
    rules: Mutex<HashMap<RuleId, AutomationRule>>,
}

impl MemoryRules {
    pub fn get(&self, id: RuleId) -> Option<AutomationRule> {
        self.rules.lock().unwrap().get(&id).cloned()
    }

    pub fn insert(&self, rule: AutomationRule) {
        self.rules.lock().unwrap().insert(rule.id, rule);
    }
}

impl RuleRepository for MemoryRules {
    async fn create(&self, rule: AutomationRule) -> Result<AutomationRule, OpsflowError> {
        self.rules.lock().unwrap().insert(rule.id, rule.clone());
        Ok(rule)
    }

    async fn get_by_id(&self, id: RuleId) -> Result<Option<AutomationRule>, OpsflowError> {
        Ok(self.get(id))
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<AutomationRule>, OpsflowError> {
        let mut rules: Vec<AutomationRule> = self
            .rules
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        rules.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rules)
    }

    async fn update(&self, rule: AutomationRule) -> Result<AutomationRule, OpsflowError> {
        self.rules.lock().unwrap().insert(rule.id, rule.clone());
        Ok(rule)
    }

    async fn delete(&self, id: RuleId) -> Result<(), OpsflowError> {
        self.rules.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn record_execution(&self, id: RuleId, at: Timestamp) -> Result<(), OpsflowError> {
        if let Some(rule) = self.rules.lock().unwrap().get_mut(&id) {
            rule.execution_count += 1;
            rule.last_executed = Some(at);
        }
        Ok(())
    }
}

/// Two clients, Ada and Grace, and one upcoming meeting with Ada.
pub struct MemoryRecords {
    pub clients: Vec<Client>,
    pub meetings: Vec<Meeting>,
}

impl MemoryRecords {
    fn seeded() -> Self {
        let now = time::now();
        let ada = client("Ada");
        let grace = client("Grace");
        let meeting = Meeting {
            id: MeetingId::new(),
            title: "Kickoff".to_string(),
            start_time: now + Duration::days(2),
            end_time: Some(now + Duration::days(2) + Duration::minutes(45)),
            status: MeetingStatus::Scheduled,
            client: Some(ContactRef {
                id: ada.id,
                name: Some(ada.name.clone()),
                email: ada.email.clone(),
                company: ada.company.clone(),
            }),
        };
        Self {
            clients: vec![ada, grace],
            meetings: vec![meeting],
        }
    }
}

fn client(name: &str) -> Client {
    Client {
        id: ClientId::new(),
        name: name.to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        company: None,
        created_at: time::now(),
    }
}

impl RecordStore for MemoryRecords {
    async fn find_meetings(
        &self,
        _owner_id: UserId,
        statuses: &[MeetingStatus],
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Meeting>, OpsflowError> {
        Ok(self
            .meetings
            .iter()
            .filter(|m| statuses.contains(&m.status) && m.start_time >= from && m.start_time <= to)
            .cloned()
            .collect())
    }

    async fn list_clients(&self, _owner_id: UserId) -> Result<Vec<Client>, OpsflowError> {
        Ok(self.clients.clone())
    }

    async fn count_projects(&self, _client_id: ClientId) -> Result<u64, OpsflowError> {
        Ok(0)
    }

    async fn count_invoices(&self, _client_id: ClientId) -> Result<u64, OpsflowError> {
        Ok(0)
    }

    async fn find_overdue_projects(
        &self,
        _owner_id: UserId,
        _statuses: &[ProjectStatus],
        _before: NaiveDate,
    ) -> Result<Vec<Project>, OpsflowError> {
        Ok(vec![])
    }
}

pub struct NoInactivity;

impl InactivityDetector for NoInactivity {
    async fn detect(
        &self,
        _owner_id: UserId,
        _config: &InactivityConfig,
    ) -> Result<Vec<InactiveClientRecord>, OpsflowError> {
        Ok(vec![])
    }
}

/// Records `(action type, candidate key)` for every call.
#[derive(Default)]
pub struct RecordingExecutor {
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ActionExecutor for RecordingExecutor {
    async fn execute(
        &self,
        _index: usize,
        action: &ActionSpec,
        payload: &ExecutionPayload,
    ) -> Result<ActionOutcome, ActionError> {
        self.calls
            .lock()
            .unwrap()
            .push((action.action_type.clone(), payload.candidate.key.clone()));
        Ok(ActionOutcome::succeeded("done"))
    }
}

#[derive(Clone)]
pub struct FixedIdentity(pub Option<UserIdentity>);

impl IdentityProvider for FixedIdentity {
    async fn current_user(&self) -> Option<UserIdentity> {
        self.0.clone()
    }
}

pub type TestState = AppState<
    Arc<MemoryRules>,
    MemoryRecords,
    NoInactivity,
    Arc<RecordingExecutor>,
    FixedIdentity,
    Arc<InProcessRunEventBus>,
>;

pub struct Harness {
    pub state: TestState,
    pub user: UserIdentity,
    pub rules: Arc<MemoryRules>,
    pub executor: Arc<RecordingExecutor>,
    pub clients: Vec<Client>,
    pub meetings: Vec<Meeting>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_identity(true)
    }

    pub fn signed_out() -> Self {
        Self::with_identity(false)
    }

    fn with_identity(signed_in: bool) -> Self {
        let user = UserIdentity {
            id: UserId::new(),
            email: "owner@example.com".to_string(),
        };
        let identity = FixedIdentity(signed_in.then(|| user.clone()));
        let rules = Arc::new(MemoryRules::default());
        let executor = Arc::new(RecordingExecutor::default());
        let event_bus = Arc::new(InProcessRunEventBus::new(64));
        let records = MemoryRecords::seeded();
        let clients = records.clients.clone();
        let meetings = records.meetings.clone();

        let orchestrator = RunOrchestrator::new(
            Arc::clone(&rules),
            TriggerResolver::new(records, NoInactivity),
            Arc::clone(&executor),
            identity.clone(),
            Arc::clone(&event_bus),
        );
        let state = AppState::from_arcs(
            Arc::new(RuleService::new(Arc::clone(&rules))),
            Arc::new(orchestrator),
            Arc::new(identity),
            event_bus,
        );

        Self {
            state,
            user,
            rules,
            executor,
            clients,
            meetings,
        }
    }

    /// Store a rule owned by the harness user.
    pub fn rule(&self, trigger_type: TriggerType, actions: &[&str]) -> AutomationRule {
        let actions: Vec<ActionSpec> = actions
            .iter()
            .map(|t| ActionSpec {
                action_type: (*t).to_string(),
                name: String::new(),
                parameters: serde_json::json!({}),
            })
            .collect();
        let rule = AutomationRule::builder()
            .name(format!("{trigger_type} rule"))
            .trigger_type(trigger_type)
            .actions(actions)
            .owner_id(self.user.id)
            .build()
            .unwrap();
        self.rules.insert(rule.clone());
        rule
    }

    pub fn router(&self) -> Router {
        crate::router::build(self.state.clone())
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.executor.calls.lock().unwrap().clone()
    }
}

/// Send one request and decode the JSON response body, `Null` when empty.
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
