//! Records: meetings, clients, and projects as read from the data store.
//!
//! These are the raw inputs of trigger resolution. They are owned by other
//! parts of the product; this crate only reads them.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{ClientId, MeetingId, ProjectId};
use crate::time::Timestamp;

/// Client contact fields joined onto a meeting or project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRef {
    pub id: ClientId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
}

macro_rules! define_status {
    ($(#[doc = $doc:expr])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Wire name used in storage and JSON.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownStatus(other.to_string())),
                }
            }
        }
    };
}

/// A stored status string matched no known variant.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

define_status!(
    /// Lifecycle of a meeting.
    MeetingStatus {
        Scheduled => "scheduled",
        Confirmed => "confirmed",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

define_status!(
    /// Lifecycle of a project.
    ProjectStatus {
        Active => "active",
        InProgress => "in_progress",
        Pending => "pending",
        OnHold => "on_hold",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

/// A calendar meeting, optionally linked to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub status: MeetingStatus,
    pub client: Option<ContactRef>,
}

/// A client of the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub created_at: Timestamp,
}

/// A project, optionally linked to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
    pub end_date: Option<NaiveDate>,
    pub client: Option<ContactRef>,
}

/// Which inactivity signals the detector considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactivityConfig {
    pub days_threshold: u32,
    pub check_communications: bool,
    pub check_project_work: bool,
}

impl Default for InactivityConfig {
    fn default() -> Self {
        Self {
            days_threshold: 30,
            check_communications: true,
            check_project_work: true,
        }
    }
}

/// Raw inactivity signals of one client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactivitySignals {
    pub no_communication: bool,
    pub no_project_work: bool,
}

impl InactivityConfig {
    /// Evaluate the signals of one client and the days since its latest activity.
    ///
    /// A signal is raised when its check is enabled and the latest matching
    /// activity, or the client's creation time when there is none, is at
    /// least `days_threshold` days old. Days are counted
    /// from the most recent considered activity, falling back to the client's
    /// creation time when it has none.
    #[must_use]
    pub fn evaluate(
        &self,
        now: Timestamp,
        created_at: Timestamp,
        last_communication: Option<Timestamp>,
        last_project_activity: Option<Timestamp>,
    ) -> (InactivitySignals, i64) {
        let threshold = i64::from(self.days_threshold);
        let stale =
            |last: Option<Timestamp>| (now - last.unwrap_or(created_at)).num_days() >= threshold;

        let signals = InactivitySignals {
            no_communication: self.check_communications && stale(last_communication),
            no_project_work: self.check_project_work && stale(last_project_activity),
        };

        let considered = [
            last_communication.filter(|_| self.check_communications),
            last_project_activity.filter(|_| self.check_project_work),
        ];
        let latest = considered.into_iter().flatten().max().unwrap_or(created_at);
        let days = (now - latest).num_days().max(0);

        (signals, days)
    }
}

/// One client as reported by the inactivity detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveClientRecord {
    pub id: ClientId,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub days_since_last_activity: i64,
    pub signals: InactivitySignals,
    pub last_communication: Option<Timestamp>,
    pub last_project_activity: Option<Timestamp>,
}
