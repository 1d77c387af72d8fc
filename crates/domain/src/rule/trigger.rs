//! Trigger type: how a rule discovers the records it acts upon.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification of a rule determining how its candidates are discovered.
///
/// Unknown values parse to [`TriggerType::Generic`], the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TriggerType {
    /// Upcoming scheduled or confirmed meetings.
    MeetingReminder,
    /// Clients without recent communication or project work.
    ClientInactive,
    /// Open projects whose end date has passed.
    ProjectDelayed,
    /// Every client of the owner.
    #[default]
    Generic,
}

/// Whether a run needs a manually selected candidate before executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Exactly one candidate must be selected.
    Required,
    /// Executes immediately as a sweep; selecting one candidate narrows the run.
    Optional,
    /// Always sweeps every candidate; selection is rejected.
    Unsupported,
}

impl TriggerType {
    /// Every trigger type, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::MeetingReminder,
        Self::ClientInactive,
        Self::ProjectDelayed,
        Self::Generic,
    ];

    /// Wire name used in storage and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MeetingReminder => "meeting_reminder",
            Self::ClientInactive => "client_inactive",
            Self::ProjectDelayed => "project_delayed",
            Self::Generic => "generic",
        }
    }

    #[must_use]
    pub fn selection_policy(self) -> SelectionPolicy {
        match self {
            Self::MeetingReminder | Self::Generic => SelectionPolicy::Required,
            Self::ClientInactive => SelectionPolicy::Optional,
            Self::ProjectDelayed => SelectionPolicy::Unsupported,
        }
    }

    /// `true` when execution is reachable without any manual selection.
    #[must_use]
    pub fn executes_without_selection(self) -> bool {
        self.selection_policy() != SelectionPolicy::Required
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .unwrap_or_default())
    }
}

impl From<String> for TriggerType {
    fn from(value: String) -> Self {
        let Ok(trigger) = value.parse::<Self>();
        trigger
    }
}

impl From<TriggerType> for String {
    fn from(value: TriggerType) -> Self {
        value.as_str().to_string()
    }
}
