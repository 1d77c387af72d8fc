//! `SQLite` implementation of [`InactivityDetector`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use opsflow_app::ports::InactivityDetector;
use opsflow_domain::error::OpsflowError;
use opsflow_domain::id::{ClientId, UserId};
use opsflow_domain::record::{InactiveClientRecord, InactivityConfig};
use opsflow_domain::time::{self, Timestamp};

use crate::codec;
use crate::error::StorageError;

/// A client with the timestamps of its latest communication and project update.
struct ActivityRow {
    id: ClientId,
    name: String,
    email: Option<String>,
    company: Option<String>,
    created_at: Timestamp,
    last_communication: Option<Timestamp>,
    last_project_activity: Option<Timestamp>,
}

impl<'r> FromRow<'r, SqliteRow> for ActivityRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: codec::parsed(row, "id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            company: row.try_get("company")?,
            created_at: codec::timestamp(row, "created_at")?,
            last_communication: codec::timestamp_opt(row, "last_communication")?,
            last_project_activity: codec::timestamp_opt(row, "last_project_activity")?,
        })
    }
}

/// Detects inactive clients from the communications and projects tables.
pub struct SqliteInactivityDetector {
    pool: SqlitePool,
}

impl SqliteInactivityDetector {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl InactivityDetector for SqliteInactivityDetector {
    async fn detect(
        &self,
        owner_id: UserId,
        config: &InactivityConfig,
    ) -> Result<Vec<InactiveClientRecord>, OpsflowError> {
        let rows: Vec<ActivityRow> = sqlx::query_as(
            "SELECT c.id, c.name, c.email, c.company, c.created_at, \
                (SELECT MAX(occurred_at) FROM communications WHERE client_id = c.id) AS last_communication, \
                (SELECT MAX(updated_at) FROM projects WHERE client_id = c.id) AS last_project_activity \
             FROM clients c WHERE c.owner_id = ? ORDER BY c.name",
        )
        .bind(owner_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;

        let now = time::now();
        let mut records: Vec<InactiveClientRecord> = rows
            .into_iter()
            .map(|row| {
                let (signals, days) = config.evaluate(
                    now,
                    row.created_at,
                    row.last_communication,
                    row.last_project_activity,
                );
                InactiveClientRecord {
                    id: row.id,
                    name: row.name,
                    email: row.email,
                    company: row.company,
                    days_since_last_activity: days,
                    signals,
                    last_communication: row.last_communication,
                    last_project_activity: row.last_project_activity,
                }
            })
            .collect();
        // most inactive first, ties keep name order
        records.sort_by(|a, b| b.days_since_last_activity.cmp(&a.days_since_last_activity));

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use chrono::Duration;
    use opsflow_domain::record::ProjectStatus;

    #[tokio::test]
    async fn should_raise_signals_from_latest_activity() {
        let pool = fixtures::memory_pool().await;
        let detector = SqliteInactivityDetector::new(pool.clone());
        let owner = UserId::new();
        let now = time::now();

        let quiet = fixtures::insert_client(
            &pool,
            owner,
            "Quiet",
            None,
            None,
            now - Duration::days(200),
        )
        .await;
        fixtures::insert_communication(&pool, owner, quiet, now - Duration::days(90)).await;
        fixtures::insert_communication(&pool, owner, quiet, now - Duration::days(60)).await;
        fixtures::insert_project(
            &pool,
            owner,
            Some(quiet),
            "Old",
            ProjectStatus::Completed,
            None,
            now - Duration::days(100),
        )
        .await;

        let busy = fixtures::insert_client(
            &pool,
            owner,
            "Busy",
            None,
            None,
            now - Duration::days(200),
        )
        .await;
        fixtures::insert_communication(&pool, owner, busy, now - Duration::days(2)).await;
        fixtures::insert_project(
            &pool,
            owner,
            Some(busy),
            "Live",
            ProjectStatus::Active,
            None,
            now - Duration::days(40),
        )
        .await;

        let records = detector
            .detect(owner, &InactivityConfig::default())
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Quiet");
        assert!(records[0].signals.no_communication);
        assert!(records[0].signals.no_project_work);
        assert_eq!(records[0].days_since_last_activity, 60);

        assert_eq!(records[1].name, "Busy");
        assert!(!records[1].signals.no_communication);
        assert!(records[1].signals.no_project_work);
        assert_eq!(records[1].days_since_last_activity, 2);
    }

    #[tokio::test]
    async fn should_ignore_disabled_checks() {
        let pool = fixtures::memory_pool().await;
        let detector = SqliteInactivityDetector::new(pool.clone());
        let owner = UserId::new();
        fixtures::insert_client(
            &pool,
            owner,
            "Silent",
            None,
            None,
            time::now() - Duration::days(45),
        )
        .await;

        let config = InactivityConfig {
            check_communications: false,
            ..InactivityConfig::default()
        };
        let records = detector.detect(owner, &config).await.unwrap();

        assert!(!records[0].signals.no_communication);
        assert!(records[0].signals.no_project_work);
        assert_eq!(records[0].days_since_last_activity, 45);
    }

    #[tokio::test]
    async fn should_not_flag_new_client_when_it_has_no_activity() {
        let pool = fixtures::memory_pool().await;
        let detector = SqliteInactivityDetector::new(pool.clone());
        let owner = UserId::new();
        fixtures::insert_client(
            &pool,
            owner,
            "Fresh",
            None,
            None,
            time::now() - Duration::days(1),
        )
        .await;

        let records = detector
            .detect(owner, &InactivityConfig::default())
            .await
            .unwrap();

        assert!(!records[0].signals.no_communication);
        assert!(!records[0].signals.no_project_work);
        assert_eq!(records[0].days_since_last_activity, 1);
    }

    #[tokio::test]
    async fn should_only_report_clients_of_owner() {
        let pool = fixtures::memory_pool().await;
        let detector = SqliteInactivityDetector::new(pool.clone());
        fixtures::insert_client(&pool, UserId::new(), "Foreign", None, None, time::now()).await;

        let records = detector
            .detect(UserId::new(), &InactivityConfig::default())
            .await
            .unwrap();
        assert!(records.is_empty());
    }
}
