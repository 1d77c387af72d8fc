//! Action outbox: the default [`ActionExecutor`].
//!
//! Each invocation is written to the `action_outbox` table as a pending row
//! carrying the full payload. Delivering the side effect (sending the email,
//! creating the task) is up to a dispatcher reading that table.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use opsflow_app::ports::{ActionError, ActionExecutor};
use opsflow_domain::id::{ExecutionId, RuleId};
use opsflow_domain::payload::ExecutionPayload;
use opsflow_domain::report::ActionOutcome;
use opsflow_domain::rule::ActionSpec;
use opsflow_domain::time::{self, Timestamp};

use crate::codec;
use crate::error::StorageError;

/// Action type that needs a deliverable address.
const SEND_EMAIL: &str = "send_email";

/// One queued action invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxEntry {
    pub id: i64,
    pub execution_id: ExecutionId,
    pub rule_id: RuleId,
    pub action_index: usize,
    pub action_type: String,
    pub candidate_key: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub created_at: Timestamp,
}

impl<'r> FromRow<'r, SqliteRow> for OutboxEntry {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let action_index: i64 = row.try_get("action_index")?;
        let payload: String = row.try_get("payload")?;
        Ok(Self {
            id: row.try_get("id")?,
            execution_id: codec::parsed(row, "execution_id")?,
            rule_id: codec::parsed(row, "rule_id")?,
            action_index: usize::try_from(action_index).map_err(codec::decode_error)?,
            action_type: row.try_get("action_type")?,
            candidate_key: row.try_get("candidate_key")?,
            payload: serde_json::from_str(&payload).map_err(codec::decode_error)?,
            status: row.try_get("status")?,
            created_at: codec::timestamp(row, "created_at")?,
        })
    }
}

/// Queues action invocations in `SQLite`.
pub struct SqliteActionOutbox {
    pool: SqlitePool,
}

impl SqliteActionOutbox {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Entries queued by one run, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the query fails.
    pub async fn list_by_execution(
        &self,
        execution_id: ExecutionId,
    ) -> Result<Vec<OutboxEntry>, StorageError> {
        let rows: Vec<OutboxEntry> = sqlx::query_as("SELECT * FROM action_outbox WHERE execution_id = ? ORDER BY id")
            .bind(execution_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn enqueue(
        &self,
        index: usize,
        action: &ActionSpec,
        payload: &ExecutionPayload,
    ) -> Result<i64, StorageError> {
        let index = i64::try_from(index).unwrap_or(i64::MAX);
        let body = serde_json::to_string(&serde_json::json!({
            "action": action,
            "payload": payload,
        }))?;

        let result = sqlx::query(
            "INSERT INTO action_outbox (execution_id, rule_id, action_index, action_type, candidate_key, payload, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(payload.execution_id.to_string())
        .bind(payload.rule.id.to_string())
        .bind(index)
        .bind(&action.action_type)
        .bind(&payload.candidate.key)
        .bind(body)
        .bind(time::to_storage(time::now()))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

impl ActionExecutor for SqliteActionOutbox {
    async fn execute(
        &self,
        index: usize,
        action: &ActionSpec,
        payload: &ExecutionPayload,
    ) -> Result<ActionOutcome, ActionError> {
        if action.action_type == SEND_EMAIL && !payload.candidate.contact.has_email() {
            return Ok(ActionOutcome::failed(format!(
                "{} has no email address",
                payload.candidate.contact.name
            )));
        }

        match self.enqueue(index, action, payload).await {
            Ok(id) => {
                tracing::debug!(outbox_id = id, action = %action, "action queued");
                Ok(ActionOutcome::succeeded(format!("queued as #{id}")))
            }
            Err(err) => {
                tracing::error!(error = %err, action = %action, "failed to queue action");
                Err(ActionError {
                    action_type: action.action_type.clone(),
                    reason: err.to_string(),
                })
            }
        }
    }
}
