//! Record store port: read access to meetings, clients, projects, invoices.

use std::future::Future;

use chrono::NaiveDate;

use opsflow_domain::error::OpsflowError;
use opsflow_domain::id::{ClientId, UserId};
use opsflow_domain::record::{Client, Meeting, MeetingStatus, Project, ProjectStatus};
use opsflow_domain::time::Timestamp;

/// Relational read access used by trigger resolution.
///
/// All queries are owner-scoped and read-only.
pub trait RecordStore {
    /// Meetings with one of `statuses` starting within `[from, to]`,
    /// ordered by start time ascending, with the linked client joined in.
    fn find_meetings(
        &self,
        owner_id: UserId,
        statuses: &[MeetingStatus],
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<Meeting>, OpsflowError>> + Send;

    /// All clients of the owner ordered by name.
    fn list_clients(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Client>, OpsflowError>> + Send;

    /// Number of projects linked to a client.
    fn count_projects(
        &self,
        client_id: ClientId,
    ) -> impl Future<Output = Result<u64, OpsflowError>> + Send;

    /// Number of invoices linked to a client.
    fn count_invoices(
        &self,
        client_id: ClientId,
    ) -> impl Future<Output = Result<u64, OpsflowError>> + Send;

    /// Projects with one of `statuses` and a non-null end date strictly
    /// before `before`, ordered by end date ascending.
    fn find_overdue_projects(
        &self,
        owner_id: UserId,
        statuses: &[ProjectStatus],
        before: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Project>, OpsflowError>> + Send;
}

impl<T: RecordStore + Send + Sync> RecordStore for std::sync::Arc<T> {
    fn find_meetings(
        &self,
        owner_id: UserId,
        statuses: &[MeetingStatus],
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<Meeting>, OpsflowError>> + Send {
        (**self).find_meetings(owner_id, statuses, from, to)
    }

    fn list_clients(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Client>, OpsflowError>> + Send {
        (**self).list_clients(owner_id)
    }

    fn count_projects(
        &self,
        client_id: ClientId,
    ) -> impl Future<Output = Result<u64, OpsflowError>> + Send {
        (**self).count_projects(client_id)
    }

    fn count_invoices(
        &self,
        client_id: ClientId,
    ) -> impl Future<Output = Result<u64, OpsflowError>> + Send {
        (**self).count_invoices(client_id)
    }

    fn find_overdue_projects(
        &self,
        owner_id: UserId,
        statuses: &[ProjectStatus],
        before: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Project>, OpsflowError>> + Send {
        (**self).find_overdue_projects(owner_id, statuses, before)
    }
}
