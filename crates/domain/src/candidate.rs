//! Candidates: the concrete records eligible for one automation run.
//!
//! A [`TargetCandidate`] is recomputed on every run and never persisted.
//! Each variant carries trigger-specific derived fields plus contact
//! details whose fields are always filled (placeholders replace missing
//! joined data).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{ClientId, MeetingId, ProjectId};
use crate::record::{InactivitySignals, ProjectStatus};
use crate::rule::TriggerType;
use crate::time::Timestamp;

/// Placeholder for a missing contact name.
pub const NO_CLIENT: &str = "no client";
/// Placeholder for a missing email address.
pub const NO_EMAIL: &str = "no email";
/// Placeholder for a missing company.
pub const NO_COMPANY: &str = "no company";

/// Contact fields of a candidate, never absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub client_id: Option<ClientId>,
    pub name: String,
    pub email: String,
    pub company: String,
}

impl ContactDetails {
    /// Contact details of a record without a linked client.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            client_id: None,
            name: NO_CLIENT.to_string(),
            email: NO_EMAIL.to_string(),
            company: NO_COMPANY.to_string(),
        }
    }

    /// `true` when a real email address is known.
    #[must_use]
    pub fn has_email(&self) -> bool {
        self.email != NO_EMAIL
    }
}

/// Why a client counts as inactive. Exactly one applies per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InactivityReason {
    NoCommunication,
    NoProjectWork,
    Both,
}

impl InactivityReason {
    /// Classify raw signals; `None` when the client is not inactive.
    #[must_use]
    pub fn classify(signals: InactivitySignals) -> Option<Self> {
        match (signals.no_communication, signals.no_project_work) {
            (true, true) => Some(Self::Both),
            (true, false) => Some(Self::NoCommunication),
            (false, true) => Some(Self::NoProjectWork),
            (false, false) => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoCommunication => "no_communication",
            Self::NoProjectWork => "no_project_work",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for InactivityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An upcoming meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingCandidate {
    pub meeting_id: MeetingId,
    pub title: String,
    pub start_time: Timestamp,
    pub duration_minutes: i64,
    /// Start date in the display timezone, `YYYY-MM-DD`.
    pub meeting_date: String,
    /// Start time in the display timezone, `HH:MM`.
    pub meeting_time: String,
    pub contact: ContactDetails,
    pub display_label: String,
}

/// A client without recent activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveClientCandidate {
    pub contact: ContactDetails,
    pub inactivity_reason: InactivityReason,
    pub days_since_last_activity: i64,
    pub last_communication: Option<Timestamp>,
    pub last_project_activity: Option<Timestamp>,
    pub display_label: String,
}

/// A project past its end date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayedProjectCandidate {
    pub project_id: ProjectId,
    pub project_name: String,
    pub status: ProjectStatus,
    pub end_date: NaiveDate,
    pub days_overdue: i64,
    pub contact: ContactDetails,
    pub display_label: String,
}

/// Any client, with its project and invoice counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCandidate {
    pub contact: ContactDetails,
    pub project_count: u64,
    pub invoice_count: u64,
    pub display_label: String,
}

/// A record eligible for one run, keyed by the rule's trigger type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trigger_type", rename_all = "snake_case")]
pub enum TargetCandidate {
    MeetingReminder(MeetingCandidate),
    ClientInactive(InactiveClientCandidate),
    ProjectDelayed(DelayedProjectCandidate),
    Generic(ClientCandidate),
}

impl TargetCandidate {
    #[must_use]
    pub fn trigger_type(&self) -> TriggerType {
        match self {
            Self::MeetingReminder(_) => TriggerType::MeetingReminder,
            Self::ClientInactive(_) => TriggerType::ClientInactive,
            Self::ProjectDelayed(_) => TriggerType::ProjectDelayed,
            Self::Generic(_) => TriggerType::Generic,
        }
    }

    /// Identity of the underlying record, used to select a candidate.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::MeetingReminder(m) => m.meeting_id.to_string(),
            Self::ProjectDelayed(p) => p.project_id.to_string(),
            Self::ClientInactive(c) => c
                .contact
                .client_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            Self::Generic(c) => c
                .contact
                .client_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn contact(&self) -> &ContactDetails {
        match self {
            Self::MeetingReminder(m) => &m.contact,
            Self::ClientInactive(c) => &c.contact,
            Self::ProjectDelayed(p) => &p.contact,
            Self::Generic(c) => &c.contact,
        }
    }

    /// Label used only to tell candidates apart when selecting one.
    #[must_use]
    pub fn display_label(&self) -> &str {
        match self {
            Self::MeetingReminder(m) => &m.display_label,
            Self::ClientInactive(c) => &c.display_label,
            Self::ProjectDelayed(p) => &p.display_label,
            Self::Generic(c) => &c.display_label,
        }
    }
}
