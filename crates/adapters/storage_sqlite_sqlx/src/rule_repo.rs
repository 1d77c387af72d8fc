//! `SQLite` implementation of [`RuleRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use opsflow_app::ports::RuleRepository;
use opsflow_domain::error::{NotFoundError, OpsflowError};
use opsflow_domain::id::{RuleId, UserId};
use opsflow_domain::rule::{AutomationRule, RawActions, TriggerType};
use opsflow_domain::time::{self, Timestamp};

use crate::codec;
use crate::error::StorageError;

struct Wrapper(AutomationRule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<AutomationRule> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let trigger_type: String = row.try_get("trigger_type")?;
        let actions: String = row.try_get("actions")?;
        let execution_count: i64 = row.try_get("execution_count")?;

        Ok(Self(AutomationRule {
            id: codec::parsed(row, "id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            trigger_type: TriggerType::from(trigger_type),
            actions: RawActions::from_storage(actions),
            is_active: row.try_get("is_active")?,
            execution_count: u64::try_from(execution_count).map_err(codec::decode_error)?,
            last_executed: codec::timestamp_opt(row, "last_executed")?,
            owner_id: codec::parsed(row, "owner_id")?,
            created_at: codec::timestamp(row, "created_at")?,
        }))
    }
}

fn not_found(id: RuleId) -> OpsflowError {
    NotFoundError {
        entity: "Rule",
        id: id.to_string(),
    }
    .into()
}

/// `SQLite`-backed rule repository.
pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RuleRepository for SqliteRuleRepository {
    async fn create(&self, rule: AutomationRule) -> Result<AutomationRule, OpsflowError> {
        let execution_count = i64::try_from(rule.execution_count).unwrap_or(i64::MAX);

        sqlx::query(
                "INSERT INTO automation_rules (id, owner_id, name, description, trigger_type, actions, is_active, execution_count, last_executed, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(rule.id.to_string())
            .bind(rule.owner_id.to_string())
            .bind(&rule.name)
            .bind(&rule.description)
            .bind(rule.trigger_type.as_str())
            .bind(rule.actions.to_storage())
            .bind(rule.is_active)
            .bind(execution_count)
            .bind(rule.last_executed.map(time::to_storage))
            .bind(time::to_storage(rule.created_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn get_by_id(&self, id: RuleId) -> Result<Option<AutomationRule>, OpsflowError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM automation_rules WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<AutomationRule>, OpsflowError> {
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM automation_rules WHERE owner_id = ? ORDER BY name")
                .bind(owner_id.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, rule: AutomationRule) -> Result<AutomationRule, OpsflowError> {
        let result = sqlx::query(
                "UPDATE automation_rules SET name = ?, description = ?, trigger_type = ?, actions = ?, is_active = ? WHERE id = ?",
            )
            .bind(&rule.name)
            .bind(&rule.description)
            .bind(rule.trigger_type.as_str())
            .bind(rule.actions.to_storage())
            .bind(rule.is_active)
            .bind(rule.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(not_found(rule.id));
        }
        Ok(rule)
    }

    async fn delete(&self, id: RuleId) -> Result<(), OpsflowError> {
        sqlx::query("DELETE FROM automation_rules WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn record_execution(&self, id: RuleId, at: Timestamp) -> Result<(), OpsflowError> {
        let result = sqlx::query(
            "UPDATE automation_rules SET execution_count = execution_count + 1, last_executed = ? WHERE id = ?",
        )
        .bind(time::to_storage(at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
