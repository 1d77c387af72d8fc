//! Entity enricher: turns raw records into display-ready candidates.
//!
//! Missing joined contact data is replaced by placeholders here so that no
//! later step ever sees an absent contact field.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use opsflow_domain::candidate::{
    ClientCandidate, ContactDetails, DelayedProjectCandidate, InactiveClientCandidate,
    InactivityReason, MeetingCandidate, NO_CLIENT, NO_COMPANY, NO_EMAIL, TargetCandidate,
};
use opsflow_domain::record::{Client, ContactRef, InactiveClientRecord, Meeting, Project};

/// Maps raw records into their [`TargetCandidate`] variant.
#[derive(Debug, Clone, Copy)]
pub struct EntityEnricher {
    display_offset: FixedOffset,
}

impl Default for EntityEnricher {
    fn default() -> Self {
        Self {
            display_offset: Utc.fix(),
        }
    }
}

impl EntityEnricher {
    /// Enricher formatting local dates and times at `display_offset`.
    #[must_use]
    pub fn new(display_offset: FixedOffset) -> Self {
        Self { display_offset }
    }

    /// Upcoming meeting with duration, local date/time and contact fallback.
    #[must_use]
    pub fn meeting(&self, meeting: Meeting) -> TargetCandidate {
        let duration_minutes = meeting
            .end_time
            .map_or(0, |end| (end - meeting.start_time).num_minutes().max(0));
        let local = meeting.start_time.with_timezone(&self.display_offset);
        let meeting_date = local.format("%Y-%m-%d").to_string();
        let meeting_time = local.format("%H:%M").to_string();
        let contact = joined_contact(meeting.client);
        let display_label = format!(
            "{} · {} · {meeting_date} {meeting_time}",
            meeting.title, contact.name
        );

        TargetCandidate::MeetingReminder(MeetingCandidate {
            meeting_id: meeting.id,
            title: meeting.title,
            start_time: meeting.start_time,
            duration_minutes,
            meeting_date,
            meeting_time,
            contact,
            display_label,
        })
    }

    /// Inactive client with its already-classified reason.
    #[must_use]
    pub fn inactive_client(
        &self,
        record: InactiveClientRecord,
        reason: InactivityReason,
    ) -> TargetCandidate {
        let contact = ContactDetails {
            client_id: Some(record.id),
            name: non_blank(Some(record.name)).unwrap_or_else(|| NO_CLIENT.to_string()),
            email: non_blank(record.email).unwrap_or_else(|| NO_EMAIL.to_string()),
            company: non_blank(record.company).unwrap_or_else(|| NO_COMPANY.to_string()),
        };
        let display_label = format!(
            "{} ({} days, {reason})",
            contact.name, record.days_since_last_activity
        );

        TargetCandidate::ClientInactive(InactiveClientCandidate {
            contact,
            inactivity_reason: reason,
            days_since_last_activity: record.days_since_last_activity,
            last_communication: record.last_communication,
            last_project_activity: record.last_project_activity,
            display_label,
        })
    }

    /// Project past `end_date`, with days overdue counted against `today`.
    #[must_use]
    pub fn delayed_project(
        &self,
        project: Project,
        end_date: NaiveDate,
        today: NaiveDate,
    ) -> TargetCandidate {
        let days_overdue = (today - end_date).num_days();
        let contact = joined_contact(project.client);
        let display_label = format!(
            "{} · {} · {days_overdue} days overdue",
            project.name, contact.name
        );

        TargetCandidate::ProjectDelayed(DelayedProjectCandidate {
            project_id: project.id,
            project_name: project.name,
            status: project.status,
            end_date,
            days_overdue,
            contact,
            display_label,
        })
    }

    /// Any client, with counts already computed (zero when degraded).
    #[must_use]
    pub fn client(&self, client: Client, project_count: u64, invoice_count: u64) -> TargetCandidate {
        let contact = ContactDetails {
            client_id: Some(client.id),
            name: non_blank(Some(client.name)).unwrap_or_else(|| NO_CLIENT.to_string()),
            email: non_blank(client.email).unwrap_or_else(|| NO_EMAIL.to_string()),
            company: non_blank(client.company).unwrap_or_else(|| NO_COMPANY.to_string()),
        };
        let display_label = if contact.has_email() {
            format!("{} <{}>", contact.name, contact.email)
        } else {
            contact.name.clone()
        };

        TargetCandidate::Generic(ClientCandidate {
            contact,
            project_count,
            invoice_count,
            display_label,
        })
    }
}

/// Contact of a record joined to a client: company, then name, then placeholder.
fn joined_contact(contact: Option<ContactRef>) -> ContactDetails {
    let Some(contact) = contact else {
        return ContactDetails::placeholder();
    };
    let company = non_blank(contact.company);
    let name = company
        .clone()
        .or_else(|| non_blank(contact.name))
        .unwrap_or_else(|| NO_CLIENT.to_string());

    ContactDetails {
        client_id: Some(contact.id),
        name,
        email: non_blank(contact.email).unwrap_or_else(|| NO_EMAIL.to_string()),
        company: company.unwrap_or_else(|| NO_COMPANY.to_string()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
