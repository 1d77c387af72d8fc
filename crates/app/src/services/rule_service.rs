//! Rule service: use-cases for managing automation rules.

use opsflow_domain::error::{NotFoundError, OpsflowError};
use opsflow_domain::id::{RuleId, UserId};
use opsflow_domain::rule::AutomationRule;

use crate::ports::RuleRepository;

/// Application service for rule CRUD operations.
///
/// Every lookup is scoped to an owner: a rule owned by someone else is
/// reported as not found.
pub struct RuleService<R> {
    repo: R,
}

impl<R: RuleRepository + Send + Sync> RuleService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new rule after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`OpsflowError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, rule), fields(rule_name = %rule.name))]
    pub async fn create_rule(&self, rule: AutomationRule) -> Result<AutomationRule, OpsflowError> {
        rule.validate()?;
        self.repo.create(rule).await
    }

    /// Look up a rule of `owner_id` by id.
    ///
    /// # Errors
    ///
    /// Returns [`OpsflowError::NotFound`] when no such rule exists for this
    /// owner, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(
        &self,
        owner_id: UserId,
        id: RuleId,
    ) -> Result<AutomationRule, OpsflowError> {
        self.repo
            .get_by_id(id)
            .await?
            .filter(|rule| rule.owner_id == owner_id)
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Rule",
                    id: id.to_string(),
                }
                .into()
            })
    }

    /// List the rules of one owner.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rules(&self, owner_id: UserId) -> Result<Vec<AutomationRule>, OpsflowError> {
        self.repo.list_by_owner(owner_id).await
    }

    /// Replace the editable fields of an existing rule.
    ///
    /// Counters are kept from the stored rule.
    ///
    /// # Errors
    ///
    /// Returns [`OpsflowError::NotFound`] when the rule does not exist for
    /// this owner, [`OpsflowError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, rule), fields(rule_id = %rule.id))]
    pub async fn update_rule(
        &self,
        owner_id: UserId,
        rule: AutomationRule,
    ) -> Result<AutomationRule, OpsflowError> {
        let current = self.get_rule(owner_id, rule.id).await?;
        rule.validate()?;
        let rule = AutomationRule {
            owner_id: current.owner_id,
            execution_count: current.execution_count,
            last_executed: current.last_executed,
            created_at: current.created_at,
            ..rule
        };
        self.repo.update(rule).await
    }

    /// Switch a rule on or off.
    ///
    /// # Errors
    ///
    /// Returns [`OpsflowError::NotFound`] when the rule does not exist for
    /// this owner, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn set_active(
        &self,
        owner_id: UserId,
        id: RuleId,
        is_active: bool,
    ) -> Result<AutomationRule, OpsflowError> {
        let mut rule = self.get_rule(owner_id, id).await?;
        rule.is_active = is_active;
        self.repo.update(rule).await
    }

    /// Delete a rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`OpsflowError::NotFound`] when the rule does not exist for
    /// this owner, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, owner_id: UserId, id: RuleId) -> Result<(), OpsflowError> {
        self.get_rule(owner_id, id).await?;
        self.repo.delete(id).await
    }
}
