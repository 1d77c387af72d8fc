//! Run orchestrator: drives one rule run from candidate resolution to verdict.
//!
//! A run is split in two steps so that a caller can inspect the candidates
//! (and pick one) before any side effect happens:
//!
//! 1. [`RunOrchestrator::prepare`] authenticates, loads the rule and
//!    resolves candidates. It never fails; problems end the session in a
//!    terminal [`RunState`].
//! 2. [`RunOrchestrator::execute`] runs every action against every target,
//!    strictly one after the other, and records the run.

use opsflow_domain::candidate::TargetCandidate;
use opsflow_domain::id::{ExecutionId, RuleId};
use opsflow_domain::payload::{RuleSnapshot, UserIdentity};
use opsflow_domain::report::{
    ActionOutcome, ActionRef, ActionResult, ExecutionReport, LogLevel, LogLine,
};
use opsflow_domain::rule::{AutomationRule, MalformedActionsError, SelectionPolicy, TriggerType};
use opsflow_domain::run::{FailureKind, RunEvent, RunState};
use opsflow_domain::time;

use crate::payload_builder::PayloadBuilder;
use crate::ports::{
    ActionExecutor, IdentityProvider, InactivityDetector, RecordStore, RuleRepository,
    RunEventPublisher,
};
use crate::recorder::ExecutionRecorder;
use crate::trigger_resolver::TriggerResolver;

/// Why a run could not be prepared, selected, or executed.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("no authenticated user")]
    Unauthenticated,
    #[error("rule could not be loaded")]
    Configuration,
    #[error("rule is inactive")]
    RuleInactive,
    #[error("malformed actions: {0}")]
    MalformedActions(#[from] MalformedActionsError),
    #[error("a candidate must be selected to run a {0} rule")]
    SelectionRequired(TriggerType),
    #[error("{0} rules always run against every candidate")]
    SelectionUnsupported(TriggerType),
    #[error("candidate {0} is not part of this run")]
    UnknownCandidate(String),
    #[error("run cannot proceed from state {0}")]
    InvalidState(&'static str),
}

#[derive(Debug, Clone)]
struct RunContext {
    rule: AutomationRule,
    user: UserIdentity,
}

/// State, log, and results of one run.
///
/// A fresh session starts `Idle` with an empty log and no selection.
#[derive(Debug, Clone)]
pub struct RunSession {
    rule_id: RuleId,
    state: RunState,
    context: Option<RunContext>,
    report: ExecutionReport,
    malformed: Option<MalformedActionsError>,
}

impl RunSession {
    fn new(rule_id: RuleId) -> Self {
        Self {
            rule_id,
            state: RunState::Idle,
            context: None,
            report: ExecutionReport::default(),
            malformed: None,
        }
    }

    #[must_use]
    pub fn rule_id(&self) -> RuleId {
        self.rule_id
    }

    #[must_use]
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Log lines appended so far, oldest first.
    #[must_use]
    pub fn log(&self) -> &[LogLine] {
        &self.report.lines
    }

    #[must_use]
    pub fn report(&self) -> &ExecutionReport {
        &self.report
    }

    /// Selection policy of the loaded rule's trigger.
    #[must_use]
    pub fn selection_policy(&self) -> Option<SelectionPolicy> {
        self.context
            .as_ref()
            .map(|ctx| ctx.rule.trigger_type.selection_policy())
    }

    /// Restrict the run to the candidate identified by `key`.
    ///
    /// # Errors
    ///
    /// - [`RunError::InvalidState`] outside `CandidatesReady`
    /// - [`RunError::SelectionUnsupported`] for triggers that always sweep
    /// - [`RunError::UnknownCandidate`] when no candidate has this key
    pub fn select(&mut self, key: &str) -> Result<(), RunError> {
        let state_name = self.state.name();
        let trigger = self.context.as_ref().map(|ctx| ctx.rule.trigger_type);
        let RunState::CandidatesReady {
            candidates,
            selected,
        } = &mut self.state
        else {
            return Err(RunError::InvalidState(state_name));
        };
        if let Some(trigger) = trigger
            && trigger.selection_policy() == SelectionPolicy::Unsupported
        {
            return Err(RunError::SelectionUnsupported(trigger));
        }
        let index = candidates
            .iter()
            .position(|c| c.key() == key)
            .ok_or_else(|| RunError::UnknownCandidate(key.to_string()))?;
        *selected = Some(index);
        Ok(())
    }

    /// `true` when [`RunOrchestrator::execute`] would start executing.
    #[must_use]
    pub fn can_execute(&self) -> bool {
        let RunState::CandidatesReady { selected, .. } = &self.state else {
            return false;
        };
        selected.is_some()
            || self
                .context
                .as_ref()
                .is_some_and(|ctx| ctx.rule.trigger_type.executes_without_selection())
    }

    /// The error matching an aborted preparation, if the session ended so.
    #[must_use]
    pub fn failure(&self) -> Option<RunError> {
        match self.state {
            RunState::HardFailure { kind } => Some(match kind {
                FailureKind::Authentication => RunError::Unauthenticated,
                FailureKind::Configuration => RunError::Configuration,
                FailureKind::RuleInactive => RunError::RuleInactive,
                FailureKind::MalformedActions => match &self.malformed {
                    Some(err) => RunError::MalformedActions(err.clone()),
                    None => RunError::InvalidState(self.state.name()),
                },
            }),
            _ => None,
        }
    }
}

/// Drives rule runs.
///
/// Owns the ports it needs; pass `Arc`s to share them with other services.
pub struct RunOrchestrator<R, S, D, X, I, P> {
    rules: R,
    resolver: TriggerResolver<S, D>,
    executor: X,
    identity: I,
    events: P,
}

impl<R, S, D, X, I, P> RunOrchestrator<R, S, D, X, I, P>
where
    R: RuleRepository + Send + Sync,
    S: RecordStore + Send + Sync,
    D: InactivityDetector + Send + Sync,
    X: ActionExecutor + Send + Sync,
    I: IdentityProvider + Send + Sync,
    P: RunEventPublisher + Send + Sync,
{
    pub fn new(
        rules: R,
        resolver: TriggerResolver<S, D>,
        executor: X,
        identity: I,
        events: P,
    ) -> Self {
        Self {
            rules,
            resolver,
            executor,
            identity,
            events,
        }
    }

    /// Authenticate, load the rule, and resolve its candidates.
    ///
    /// The returned session is either `CandidatesReady` or terminal
    /// (`NoCandidates` or `HardFailure`). Nothing is written.
    #[tracing::instrument(skip(self))]
    pub async fn prepare(&self, rule_id: RuleId) -> RunSession {
        let mut session = RunSession::new(rule_id);

        let Some(user) = self.identity.current_user().await else {
            self.append(&mut session, LogLevel::Error, "Not signed in: cannot run automations")
                .await;
            self.abort(&mut session, FailureKind::Authentication).await;
            return session;
        };

        let rule = match self.rules.get_by_id(rule_id).await {
            Ok(Some(rule)) if rule.owner_id == user.id => rule,
            Ok(_) => {
                self.append(&mut session, LogLevel::Error, format!("Rule {rule_id} not found"))
                    .await;
                self.abort(&mut session, FailureKind::Configuration).await;
                return session;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load rule");
                self.append(
                    &mut session,
                    LogLevel::Error,
                    format!("Could not load rule: {err}"),
                )
                .await;
                self.abort(&mut session, FailureKind::Configuration).await;
                return session;
            }
        };

        if !rule.is_active {
            self.append(
                &mut session,
                LogLevel::Error,
                format!("Rule \"{}\" is inactive", rule.name),
            )
            .await;
            self.abort(&mut session, FailureKind::RuleInactive).await;
            return session;
        }

        session.state = RunState::Resolving;
        self.append(
            &mut session,
            LogLevel::Info,
            format!("Resolving {} candidates for \"{}\"", rule.trigger_type, rule.name),
        )
        .await;

        let trigger = rule.trigger_type;
        let resolution = self.resolver.resolve(trigger, user.id, time::now()).await;
        for diagnostic in resolution.diagnostics {
            self.append(&mut session, LogLevel::Warning, diagnostic).await;
        }
        self.notify(RunEvent::CandidatesResolved {
            rule_id,
            count: resolution.candidates.len(),
        })
        .await;
        session.context = Some(RunContext { rule, user });

        if resolution.candidates.is_empty() {
            session.state = RunState::NoCandidates;
            self.append(&mut session, LogLevel::Info, self.no_candidates_guidance(trigger))
                .await;
            let verdict = session.report.summary();
            self.append(&mut session, LogLevel::Info, verdict).await;
            return session;
        }

        let count = resolution.candidates.len();
        let guidance = match trigger.selection_policy() {
            SelectionPolicy::Required => ", select one to run",
            SelectionPolicy::Optional => ", select one or run all",
            SelectionPolicy::Unsupported => ", all will be processed",
        };
        self.append(
            &mut session,
            LogLevel::Info,
            format!("Found {count} candidate(s){guidance}"),
        )
        .await;
        session.state = RunState::CandidatesReady {
            candidates: resolution.candidates,
            selected: None,
        };
        session
    }

    /// Run every action against every target of a ready session.
    ///
    /// Targets are the selected candidate, or all candidates for triggers
    /// that run without a selection. Actions run in declared order, one at a
    /// time; a failing action is logged and counted, and the run moves on.
    ///
    /// # Errors
    ///
    /// - [`RunError::InvalidState`] unless the session is `CandidatesReady`
    /// - [`RunError::SelectionRequired`] when the trigger needs a selection
    /// - [`RunError::MalformedActions`] when the rule's actions cannot be
    ///   normalized; the session ends in `HardFailure` and nothing runs
    #[tracing::instrument(skip(self, session), fields(rule_id = %session.rule_id))]
    pub async fn execute(&self, session: &mut RunSession) -> Result<ExecutionReport, RunError> {
        let Some(context) = session.context.clone() else {
            return Err(RunError::InvalidState(session.state.name()));
        };
        let targets: Vec<TargetCandidate> = match &session.state {
            RunState::CandidatesReady {
                selected: Some(index),
                candidates,
            } => candidates.get(*index).cloned().into_iter().collect(),
            RunState::CandidatesReady { candidates, .. } => candidates.clone(),
            other => return Err(RunError::InvalidState(other.name())),
        };
        if !session.can_execute() {
            return Err(RunError::SelectionRequired(context.rule.trigger_type));
        }

        session.state = RunState::Executing;
        let actions = match context.rule.actions.normalize() {
            Ok(actions) => actions,
            Err(err) => {
                tracing::warn!(error = %err, "rule actions are malformed");
                self.append(
                    session,
                    LogLevel::Error,
                    format!("Invalid actions for \"{}\": {err}", context.rule.name),
                )
                .await;
                session.malformed = Some(err.clone());
                self.abort(session, FailureKind::MalformedActions).await;
                return Err(err.into());
            }
        };

        let execution_id = ExecutionId::new();
        session.report.execution_id = Some(execution_id);
        let snapshot = RuleSnapshot::new(&context.rule, actions);
        if snapshot.actions.is_empty() {
            self.append(session, LogLevel::Warning, "Rule has no actions").await;
        }
        self.append(
            session,
            LogLevel::Info,
            format!(
                "Running {} action(s) against {} candidate(s)",
                snapshot.actions.len(),
                targets.len()
            ),
        )
        .await;

        for candidate in &targets {
            let payload = PayloadBuilder::build(candidate, &snapshot, &context.user, execution_id);
            for (index, action) in snapshot.actions.iter().enumerate() {
                let outcome = match self.executor.execute(index, action, &payload).await {
                    Ok(outcome) => outcome,
                    Err(err) => ActionOutcome::failed(err.to_string()),
                };
                let result = ActionResult::from_outcome(
                    ActionRef::new(index, action),
                    payload.candidate.key.clone(),
                    outcome,
                );
                if result.success {
                    session.report.success_count += 1;
                    let message = result.message.as_deref().unwrap_or("done");
                    let line = format!("{action} for {}: {message}", candidate.display_label());
                    self.append(session, LogLevel::Success, line).await;
                } else {
                    session.report.error_count += 1;
                    let error = result.error.as_deref().unwrap_or("unknown error");
                    let line = format!("{action} for {} failed: {error}", candidate.display_label());
                    self.append(session, LogLevel::Error, line).await;
                }
                session.report.results.push(result);
            }
        }

        let success_count = session.report.success_count;
        let error_count = session.report.error_count;
        session.state = RunState::Completed {
            success_count,
            error_count,
        };
        ExecutionRecorder::new(&self.rules)
            .record(context.rule.id, time::now())
            .await;

        let level = if error_count == 0 {
            LogLevel::Success
        } else {
            LogLevel::Warning
        };
        let verdict = session.report.summary();
        self.append(session, level, verdict).await;
        self.notify(RunEvent::RunCompleted {
            rule_id: context.rule.id,
            execution_id,
            success_count,
            error_count,
        })
        .await;
        tracing::info!(success_count, error_count, "run completed");

        Ok(session.report.clone())
    }

    /// Prepare, optionally select, and execute in one call.
    ///
    /// A run with no candidates succeeds with an empty report.
    ///
    /// # Errors
    ///
    /// Any [`RunError`] raised while preparing, selecting, or executing.
    pub async fn run(
        &self,
        rule_id: RuleId,
        selection: Option<&str>,
    ) -> Result<ExecutionReport, RunError> {
        let mut session = self.prepare(rule_id).await;
        if let Some(err) = session.failure() {
            return Err(err);
        }
        if session.state == RunState::NoCandidates {
            return Ok(session.report);
        }
        if let Some(key) = selection {
            session.select(key)?;
        }
        self.execute(&mut session).await
    }

    fn no_candidates_guidance(&self, trigger: TriggerType) -> String {
        match trigger {
            TriggerType::MeetingReminder => format!(
                "No upcoming meetings in the next {} days",
                self.resolver.meeting_window_days()
            ),
            TriggerType::ClientInactive => "No inactive clients found".to_string(),
            TriggerType::ProjectDelayed => "No delayed projects found".to_string(),
            TriggerType::Generic => "No clients found".to_string(),
        }
    }

    async fn abort(&self, session: &mut RunSession, kind: FailureKind) {
        session.state = RunState::HardFailure { kind };
        let verdict = format!(
            "Run aborted: {} succeeded, {} failed",
            session.report.success_count, session.report.error_count
        );
        self.append(session, LogLevel::Error, verdict).await;
        self.notify(RunEvent::RunAborted {
            rule_id: session.rule_id,
            kind,
        })
        .await;
        tracing::warn!(?kind, "run aborted");
    }

    async fn append(&self, session: &mut RunSession, level: LogLevel, message: impl Into<String>) {
        let line = LogLine::new(level, message);
        session.report.lines.push(line.clone());
        self.notify(RunEvent::LogLineAppended {
            rule_id: session.rule_id,
            line,
        })
        .await;
    }

    async fn notify(&self, event: RunEvent) {
        if let Err(err) = self.events.publish(event).await {
            tracing::warn!(error = %err, "failed to publish run event");
        }
    }
}
