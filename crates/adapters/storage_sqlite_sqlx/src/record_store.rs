//! `SQLite` implementation of [`RecordStore`].

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use opsflow_app::ports::RecordStore;
use opsflow_domain::error::OpsflowError;
use opsflow_domain::id::{ClientId, UserId};
use opsflow_domain::record::{Client, ContactRef, Meeting, MeetingStatus, Project, ProjectStatus};
use opsflow_domain::time::{self, Timestamp};

use crate::codec;
use crate::error::StorageError;

/// Contact columns selected from a `LEFT JOIN clients c`.
const CONTACT_COLUMNS: &str =
    "c.id AS contact_id, c.name AS contact_name, c.email AS contact_email, c.company AS contact_company";

fn contact(row: &SqliteRow) -> Result<Option<ContactRef>, sqlx::Error> {
    let Some(id) = codec::parsed_opt(row, "contact_id")? else {
        return Ok(None);
    };
    Ok(Some(ContactRef {
        id,
        name: row.try_get("contact_name")?,
        email: row.try_get("contact_email")?,
        company: row.try_get("contact_company")?,
    }))
}

struct MeetingRow(Meeting);

impl<'r> FromRow<'r, SqliteRow> for MeetingRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Meeting {
            id: codec::parsed(row, "id")?,
            title: row.try_get("title")?,
            start_time: codec::timestamp(row, "start_time")?,
            end_time: codec::timestamp_opt(row, "end_time")?,
            status: codec::parsed(row, "status")?,
            client: contact(row)?,
        }))
    }
}

struct ClientRow(Client);

impl<'r> FromRow<'r, SqliteRow> for ClientRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Client {
            id: codec::parsed(row, "id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            company: row.try_get("company")?,
            created_at: codec::timestamp(row, "created_at")?,
        }))
    }
}

struct ProjectRow(Project);

impl<'r> FromRow<'r, SqliteRow> for ProjectRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Project {
            id: codec::parsed(row, "id")?,
            name: row.try_get("name")?,
            status: codec::parsed(row, "status")?,
            end_date: codec::date_opt(row, "end_date")?,
            client: contact(row)?,
        }))
    }
}

/// `SQLite`-backed read access to meetings, clients, projects and invoices.
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn count_for_client(&self, table: &str, client_id: ClientId) -> Result<u64, OpsflowError> {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE client_id = ?");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(client_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl RecordStore for SqliteRecordStore {
    async fn find_meetings(
        &self,
        owner_id: UserId,
        statuses: &[MeetingStatus],
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Meeting>, OpsflowError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT m.id, m.title, m.start_time, m.end_time, m.status, {CONTACT_COLUMNS} \
             FROM meetings m LEFT JOIN clients c ON c.id = m.client_id \
             WHERE m.owner_id = ? AND m.status IN ({}) AND m.start_time >= ? AND m.start_time <= ? \
             ORDER BY m.start_time ASC",
            codec::placeholders(statuses.len())
        );

        let mut query = sqlx::query_as::<_, MeetingRow>(&sql).bind(owner_id.to_string());
        for status in statuses {
            query = query.bind(status.as_str());
        }
        let rows = query
            .bind(time::to_storage(from))
            .bind(time::to_storage(to))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn list_clients(&self, owner_id: UserId) -> Result<Vec<Client>, OpsflowError> {
        let rows: Vec<ClientRow> = sqlx::query_as(
            "SELECT id, name, email, company, created_at FROM clients WHERE owner_id = ? ORDER BY name",
        )
        .bind(owner_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn count_projects(&self, client_id: ClientId) -> Result<u64, OpsflowError> {
        self.count_for_client("projects", client_id).await
    }

    async fn count_invoices(&self, client_id: ClientId) -> Result<u64, OpsflowError> {
        self.count_for_client("invoices", client_id).await
    }

    async fn find_overdue_projects(
        &self,
        owner_id: UserId,
        statuses: &[ProjectStatus],
        before: NaiveDate,
    ) -> Result<Vec<Project>, OpsflowError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT p.id, p.name, p.status, p.end_date, {CONTACT_COLUMNS} \
             FROM projects p LEFT JOIN clients c ON c.id = p.client_id \
             WHERE p.owner_id = ? AND p.status IN ({}) AND p.end_date IS NOT NULL AND p.end_date < ? \
             ORDER BY p.end_date ASC",
            codec::placeholders(statuses.len())
        );

        let mut query = sqlx::query_as::<_, ProjectRow>(&sql).bind(owner_id.to_string());
        for status in statuses {
            query = query.bind(status.as_str());
        }
        let rows = query
            .bind(codec::date_to_storage(before))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    const OPEN: [ProjectStatus; 3] = [
        ProjectStatus::Active,
        ProjectStatus::InProgress,
        ProjectStatus::Pending,
    ];

    #[tokio::test]
    async fn should_find_meetings_in_window_with_joined_contact() {
        let pool = fixtures::memory_pool().await;
        let store = SqliteRecordStore::new(pool.clone());
        let owner = UserId::new();
        let client = fixtures::insert_client(
            &pool,
            owner,
            "Grace",
            Some("grace@example.com"),
            Some("Navy"),
            now(),
        )
        .await;
        let later = fixtures::insert_meeting(
            &pool,
            owner,
            None,
            "Later",
            now() + Duration::days(10),
            None,
            MeetingStatus::Confirmed,
        )
        .await;
        let soon = fixtures::insert_meeting(
            &pool,
            owner,
            Some(client),
            "Soon",
            now() + Duration::days(1),
            Some(now() + Duration::days(1) + Duration::hours(1)),
            MeetingStatus::Scheduled,
        )
        .await;
        fixtures::insert_meeting(
            &pool,
            owner,
            None,
            "Cancelled",
            now() + Duration::days(2),
            None,
            MeetingStatus::Cancelled,
        )
        .await;
        fixtures::insert_meeting(
            &pool,
            owner,
            None,
            "Too far",
            now() + Duration::days(31),
            None,
            MeetingStatus::Scheduled,
        )
        .await;
        fixtures::insert_meeting(
            &pool,
            UserId::new(),
            None,
            "Foreign",
            now() + Duration::days(1),
            None,
            MeetingStatus::Scheduled,
        )
        .await;

        let meetings = store
            .find_meetings(
                owner,
                &[MeetingStatus::Scheduled, MeetingStatus::Confirmed],
                now(),
                now() + Duration::days(30),
            )
            .await
            .unwrap();

        let ids: Vec<_> = meetings.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![soon, later]);
        let contact = meetings[0].client.as_ref().unwrap();
        assert_eq!(contact.id, client);
        assert_eq!(contact.company.as_deref(), Some("Navy"));
        assert_eq!(
            meetings[0].end_time,
            Some(now() + Duration::days(1) + Duration::hours(1))
        );
        assert!(meetings[1].client.is_none());
    }

    #[tokio::test]
    async fn should_list_clients_of_owner_by_name() {
        let pool = fixtures::memory_pool().await;
        let store = SqliteRecordStore::new(pool.clone());
        let owner = UserId::new();
        fixtures::insert_client(&pool, owner, "Zed", None, None, now()).await;
        fixtures::insert_client(&pool, owner, "Ada", None, None, now()).await;
        fixtures::insert_client(&pool, UserId::new(), "Bob", None, None, now()).await;

        let names: Vec<String> = store
            .list_clients(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Ada", "Zed"]);
    }

    #[tokio::test]
    async fn should_count_projects_and_invoices_per_client() {
        let pool = fixtures::memory_pool().await;
        let store = SqliteRecordStore::new(pool.clone());
        let owner = UserId::new();
        let ada = fixtures::insert_client(&pool, owner, "Ada", None, None, now()).await;
        let bob = fixtures::insert_client(&pool, owner, "Bob", None, None, now()).await;
        fixtures::insert_project(&pool, owner, Some(ada), "Site", ProjectStatus::Active, None, now())
            .await;
        fixtures::insert_invoice(&pool, owner, ada).await;
        fixtures::insert_invoice(&pool, owner, ada).await;

        assert_eq!(store.count_projects(ada).await.unwrap(), 1);
        assert_eq!(store.count_invoices(ada).await.unwrap(), 2);
        assert_eq!(store.count_projects(bob).await.unwrap(), 0);
        assert_eq!(store.count_invoices(bob).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn should_find_open_projects_ending_before_date() {
        let pool = fixtures::memory_pool().await;
        let store = SqliteRecordStore::new(pool.clone());
        let owner = UserId::new();
        let client =
            fixtures::insert_client(&pool, owner, "Ada", None, Some("Analytical"), now()).await;
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let late = fixtures::insert_project(
            &pool,
            owner,
            Some(client),
            "Late",
            ProjectStatus::Pending,
            Some(today - Duration::days(2)),
            now(),
        )
        .await;
        let later = fixtures::insert_project(
            &pool,
            owner,
            None,
            "Later",
            ProjectStatus::InProgress,
            Some(today - Duration::days(9)),
            now(),
        )
        .await;
        fixtures::insert_project(&pool, owner, None, "Today", ProjectStatus::Active, Some(today), now())
            .await;
        fixtures::insert_project(
            &pool,
            owner,
            None,
            "Done",
            ProjectStatus::Completed,
            Some(today - Duration::days(5)),
            now(),
        )
        .await;
        fixtures::insert_project(&pool, owner, None, "Open", ProjectStatus::Active, None, now()).await;

        let projects = store
            .find_overdue_projects(owner, &OPEN, today)
            .await
            .unwrap();

        let ids: Vec<_> = projects.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![later, late]);
        assert_eq!(
            projects[1].client.as_ref().unwrap().company.as_deref(),
            Some("Analytical")
        );
    }

    #[tokio::test]
    async fn should_return_empty_list_for_empty_status_filter() {
        let pool = fixtures::memory_pool().await;
        let store = SqliteRecordStore::new(pool);
        let projects = store
            .find_overdue_projects(UserId::new(), &[], NaiveDate::MAX)
            .await
            .unwrap();
        assert!(projects.is_empty());
    }

    #[tokio::test]
    async fn should_fail_when_pool_is_closed() {
        let pool = fixtures::memory_pool().await;
        let store = SqliteRecordStore::new(pool.clone());
        pool.close().await;

        let err = store.list_clients(UserId::new()).await.unwrap_err();
        assert!(matches!(err, OpsflowError::Storage(_)));
    }
}
