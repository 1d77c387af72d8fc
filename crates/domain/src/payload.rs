//! Execution payload: the data bundle handed to one action invocation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::candidate::{ContactDetails, InactivityReason};
use crate::id::{ExecutionId, RuleId, UserId};
use crate::rule::{ActionSpec, AutomationRule, TriggerType};
use crate::time::Timestamp;

/// The authenticated caller of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
}

/// A rule as seen by actions: identity plus already-normalized actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSnapshot {
    pub id: RuleId,
    pub name: String,
    pub description: String,
    pub trigger_type: TriggerType,
    pub actions: Vec<ActionSpec>,
}

impl RuleSnapshot {
    /// Snapshot `rule` with the given normalized actions.
    #[must_use]
    pub fn new(rule: &AutomationRule, actions: Vec<ActionSpec>) -> Self {
        Self {
            id: rule.id,
            name: rule.name.clone(),
            description: rule.description.clone(),
            trigger_type: rule.trigger_type,
            actions,
        }
    }
}

/// Identity and contact fields of the candidate an action runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateIdentity {
    /// Key of the underlying record (meeting, project, or client id).
    pub key: String,
    pub display_label: String,
    #[serde(flatten)]
    pub contact: ContactDetails,
}

/// Trigger-specific fields added to a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerDetails {
    MeetingReminder {
        meeting_title: String,
        meeting_date: String,
        meeting_time: String,
        start_time: Timestamp,
        duration_minutes: i64,
    },
    ClientInactive {
        inactivity_reason: InactivityReason,
        days_since_last_activity: i64,
    },
    ProjectDelayed {
        project_name: String,
        days_overdue: i64,
        end_date: NaiveDate,
    },
    Generic {
        project_count: u64,
        invoice_count: u64,
    },
}

/// Everything one action invocation receives. Ephemeral, rebuilt every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPayload {
    pub execution_id: ExecutionId,
    pub rule: RuleSnapshot,
    pub invoking_user: UserIdentity,
    pub candidate: CandidateIdentity,
    pub details: TriggerDetails,
}
