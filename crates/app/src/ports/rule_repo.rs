//! Rule repository port: persistence for automation rules.

use std::future::Future;

use opsflow_domain::error::OpsflowError;
use opsflow_domain::id::{RuleId, UserId};
use opsflow_domain::rule::AutomationRule;
use opsflow_domain::time::Timestamp;

/// Repository for persisting and querying [`AutomationRule`]s.
pub trait RuleRepository {
    /// Create a new rule in storage.
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, OpsflowError>> + Send;

    /// Get a rule by its unique identifier.
    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, OpsflowError>> + Send;

    /// Get all rules of one owner, ordered by name.
    fn list_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, OpsflowError>> + Send;

    /// Update the editable fields of an existing rule.
    ///
    /// Run counters are not touched; see [`record_execution`](Self::record_execution).
    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, OpsflowError>> + Send;

    /// Delete a rule by its unique identifier.
    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), OpsflowError>> + Send;

    /// Atomically increment `execution_count` by one and set `last_executed`.
    ///
    /// Implementations must perform the increment inside the store (a single
    /// conditional update), never as a read-modify-write, so concurrent runs
    /// of the same rule cannot lose an increment.
    fn record_execution(
        &self,
        id: RuleId,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), OpsflowError>> + Send;
}

impl<T: RuleRepository + Send + Sync> RuleRepository for std::sync::Arc<T> {
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, OpsflowError>> + Send {
        (**self).create(rule)
    }

    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, OpsflowError>> + Send {
        (**self).get_by_id(id)
    }

    fn list_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, OpsflowError>> + Send {
        (**self).list_by_owner(owner_id)
    }

    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, OpsflowError>> + Send {
        (**self).update(rule)
    }

    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), OpsflowError>> + Send {
        (**self).delete(id)
    }

    fn record_execution(
        &self,
        id: RuleId,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), OpsflowError>> + Send {
        (**self).record_execution(id, at)
    }
}
