//! Trigger resolver: finds the records a rule would act upon right now.

use chrono::Duration;

use opsflow_domain::candidate::{InactivityReason, TargetCandidate};
use opsflow_domain::id::UserId;
use opsflow_domain::record::{InactivityConfig, MeetingStatus, ProjectStatus};
use opsflow_domain::rule::TriggerType;
use opsflow_domain::time::{Timestamp, date_of};

use crate::enricher::EntityEnricher;
use crate::ports::{InactivityDetector, RecordStore};

/// Default look-ahead for meeting reminders.
pub const DEFAULT_MEETING_WINDOW_DAYS: u32 = 30;

/// Meetings that still deserve a reminder.
const REMINDABLE_MEETINGS: [MeetingStatus; 2] = [MeetingStatus::Scheduled, MeetingStatus::Confirmed];

/// Projects that can still be late.
const OPEN_PROJECTS: [ProjectStatus; 3] = [
    ProjectStatus::Active,
    ProjectStatus::InProgress,
    ProjectStatus::Pending,
];

/// Outcome of one resolution.
///
/// `diagnostics` holds one message per degraded or failed query. A failed
/// query never aborts resolution; it yields fewer (or zeroed) candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub candidates: Vec<TargetCandidate>,
    pub diagnostics: Vec<String>,
}

impl Resolution {
    fn failed(diagnostic: String) -> Self {
        Self {
            candidates: Vec::new(),
            diagnostics: vec![diagnostic],
        }
    }
}

/// Dispatches on the trigger type and produces enriched candidates.
///
/// Resolution is read-only; calling it twice without intervening writes
/// yields the same candidates in the same order.
pub struct TriggerResolver<S, D> {
    store: S,
    detector: D,
    enricher: EntityEnricher,
    meeting_window_days: u32,
    inactivity: InactivityConfig,
}

impl<S, D> TriggerResolver<S, D>
where
    S: RecordStore + Send + Sync,
    D: InactivityDetector + Send + Sync,
{
    /// Resolver with the default window, inactivity settings, and UTC display.
    pub fn new(store: S, detector: D) -> Self {
        Self {
            store,
            detector,
            enricher: EntityEnricher::default(),
            meeting_window_days: DEFAULT_MEETING_WINDOW_DAYS,
            inactivity: InactivityConfig::default(),
        }
    }

    #[must_use]
    pub fn with_enricher(mut self, enricher: EntityEnricher) -> Self {
        self.enricher = enricher;
        self
    }

    #[must_use]
    pub fn with_meeting_window_days(mut self, days: u32) -> Self {
        self.meeting_window_days = days;
        self
    }

    #[must_use]
    pub fn with_inactivity(mut self, config: InactivityConfig) -> Self {
        self.inactivity = config;
        self
    }

    #[must_use]
    pub fn meeting_window_days(&self) -> u32 {
        self.meeting_window_days
    }

    /// Resolve the candidates of `trigger` for `owner_id` as of `now`.
    #[tracing::instrument(skip(self, now), fields(trigger = %trigger))]
    pub async fn resolve(&self, trigger: TriggerType, owner_id: UserId, now: Timestamp) -> Resolution {
        let resolution = match trigger {
            TriggerType::MeetingReminder => self.upcoming_meetings(owner_id, now).await,
            TriggerType::ClientInactive => self.inactive_clients(owner_id).await,
            TriggerType::ProjectDelayed => self.delayed_projects(owner_id, now).await,
            TriggerType::Generic => self.all_clients(owner_id).await,
        };
        tracing::debug!(
            candidates = resolution.candidates.len(),
            diagnostics = resolution.diagnostics.len(),
            "trigger resolved"
        );
        resolution
    }

    async fn upcoming_meetings(&self, owner_id: UserId, now: Timestamp) -> Resolution {
        let until = now + Duration::days(i64::from(self.meeting_window_days));
        match self
            .store
            .find_meetings(owner_id, &REMINDABLE_MEETINGS, now, until)
            .await
        {
            Ok(meetings) => Resolution {
                candidates: meetings
                    .into_iter()
                    .map(|meeting| self.enricher.meeting(meeting))
                    .collect(),
                diagnostics: Vec::new(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "meeting query failed");
                Resolution::failed(format!("Could not load upcoming meetings: {err}"))
            }
        }
    }

    async fn inactive_clients(&self, owner_id: UserId) -> Resolution {
        match self.detector.detect(owner_id, &self.inactivity).await {
            Ok(records) => Resolution {
                candidates: records
                    .into_iter()
                    .filter_map(|record| {
                        InactivityReason::classify(record.signals)
                            .map(|reason| self.enricher.inactive_client(record, reason))
                    })
                    .collect(),
                diagnostics: Vec::new(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "inactivity detection failed");
                Resolution::failed(format!("Could not detect inactive clients: {err}"))
            }
        }
    }

    async fn delayed_projects(&self, owner_id: UserId, now: Timestamp) -> Resolution {
        let today = date_of(now);
        match self
            .store
            .find_overdue_projects(owner_id, &OPEN_PROJECTS, today)
            .await
        {
            Ok(projects) => Resolution {
                candidates: projects
                    .into_iter()
                    .filter_map(|project| {
                        // the store filters on it, but the type still allows a null
                        let end_date = project.end_date?;
                        Some(self.enricher.delayed_project(project, end_date, today))
                    })
                    .collect(),
                diagnostics: Vec::new(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "overdue project query failed");
                Resolution::failed(format!("Could not load delayed projects: {err}"))
            }
        }
    }

    async fn all_clients(&self, owner_id: UserId) -> Resolution {
        let clients = match self.store.list_clients(owner_id).await {
            Ok(clients) => clients,
            Err(err) => {
                tracing::warn!(error = %err, "client query failed");
                return Resolution::failed(format!("Could not load clients: {err}"));
            }
        };

        let mut resolution = Resolution::default();
        for client in clients {
            let project_count = match self.store.count_projects(client.id).await {
                Ok(count) => count,
                Err(err) => {
                    tracing::warn!(client_id = %client.id, error = %err, "project count degraded to 0");
                    resolution
                        .diagnostics
                        .push(format!("Project count unavailable for {}: {err}", client.name));
                    0
                }
            };
            let invoice_count = match self.store.count_invoices(client.id).await {
                Ok(count) => count,
                Err(err) => {
                    tracing::warn!(client_id = %client.id, error = %err, "invoice count degraded to 0");
                    resolution
                        .diagnostics
                        .push(format!("Invoice count unavailable for {}: {err}", client.name));
                    0
                }
            };
            resolution
                .candidates
                .push(self.enricher.client(client, project_count, invoice_count));
        }
        resolution
    }
}
