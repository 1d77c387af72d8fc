//! Automation rules: trigger type → ordered actions.
//!
//! A rule is created and toggled by its owner. When run, its
//! [`TriggerType`] decides which records are candidates and its
//! [`ActionSpec`]s are executed against them in order.

mod action;
mod trigger;

pub use action::{ActionSpec, MalformedActionsError, RawActions};
pub use trigger::{SelectionPolicy, TriggerType};

use serde::{Deserialize, Serialize};

use crate::error::{OpsflowError, ValidationError};
use crate::id::{RuleId, UserId};
use crate::time::Timestamp;

/// A rule that runs a sequence of actions against the records its trigger finds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: RuleId,
    pub name: String,
    pub description: String,
    pub trigger_type: TriggerType,
    pub actions: RawActions,
    pub is_active: bool,
    /// Number of completed runs. Only ever increases.
    pub execution_count: u64,
    /// Completion time of the latest run; never set at run start.
    pub last_executed: Option<Timestamp>,
    pub owner_id: UserId,
    pub created_at: Timestamp,
}

impl AutomationRule {
    /// Create a builder for constructing an [`AutomationRule`].
    #[must_use]
    pub fn builder() -> AutomationRuleBuilder {
        AutomationRuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// Actions are deliberately not checked here: a malformed actions value
    /// is detected when a run normalizes them.
    ///
    /// # Errors
    ///
    /// Returns [`OpsflowError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), OpsflowError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`AutomationRule`].
#[derive(Debug, Default)]
pub struct AutomationRuleBuilder {
    id: Option<RuleId>,
    name: Option<String>,
    description: Option<String>,
    trigger_type: Option<TriggerType>,
    actions: Option<RawActions>,
    is_active: Option<bool>,
    execution_count: u64,
    last_executed: Option<Timestamp>,
    owner_id: Option<UserId>,
    created_at: Option<Timestamp>,
}

impl AutomationRuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn trigger_type(mut self, trigger_type: TriggerType) -> Self {
        self.trigger_type = Some(trigger_type);
        self
    }

    #[must_use]
    pub fn actions(mut self, actions: impl Into<RawActions>) -> Self {
        self.actions = Some(actions.into());
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    #[must_use]
    pub fn execution_count(mut self, count: u64) -> Self {
        self.execution_count = count;
        self
    }

    #[must_use]
    pub fn last_executed(mut self, ts: Timestamp) -> Self {
        self.last_executed = Some(ts);
        self
    }

    #[must_use]
    pub fn owner_id(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return an [`AutomationRule`].
    ///
    /// # Errors
    ///
    /// Returns [`OpsflowError::Validation`] if the name is missing or empty.
    pub fn build(self) -> Result<AutomationRule, OpsflowError> {
        let rule = AutomationRule {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            trigger_type: self.trigger_type.unwrap_or_default(),
            actions: self.actions.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
            execution_count: self.execution_count,
            last_executed: self.last_executed,
            owner_id: self.owner_id.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        };
        rule.validate()?;
        Ok(rule)
    }
}
