//! Execution recorder: best-effort run counter persistence.

use opsflow_domain::id::RuleId;
use opsflow_domain::time::Timestamp;

use crate::ports::RuleRepository;

/// Records a completed run on its rule.
///
/// A failure here is only logged. The actions have already produced their
/// side effects, so the run is still reported as completed.
pub struct ExecutionRecorder<'a, R> {
    rules: &'a R,
}

impl<'a, R: RuleRepository + Send + Sync> ExecutionRecorder<'a, R> {
    pub fn new(rules: &'a R) -> Self {
        Self { rules }
    }

    /// Increment the rule's counter once and stamp `at`.
    ///
    /// Returns whether the update was persisted.
    #[tracing::instrument(skip(self, at))]
    pub async fn record(&self, rule_id: RuleId, at: Timestamp) -> bool {
        match self.rules.record_execution(rule_id, at).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "failed to persist run counter");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rule_service::tests::InMemoryRuleRepo;
    use opsflow_domain::rule::AutomationRule;

    #[tokio::test]
    async fn should_increment_counter_and_stamp_time() {
        let repo = InMemoryRuleRepo::default();
        let rule = AutomationRule::builder().name("r").build().unwrap();
        let id = rule.id;
        repo.insert(rule);
        let at = opsflow_domain::time::now();

        assert!(ExecutionRecorder::new(&repo).record(id, at).await);

        let stored = repo.get(id).unwrap();
        assert_eq!(stored.execution_count, 1);
        assert_eq!(stored.last_executed, Some(at));
    }

    #[tokio::test]
    async fn should_swallow_storage_failure() {
        let repo = InMemoryRuleRepo::default();
        let rule = AutomationRule::builder().name("r").build().unwrap();
        let id = rule.id;
        repo.insert(rule);
        repo.fail_writes();

        assert!(!ExecutionRecorder::new(&repo).record(id, opsflow_domain::time::now()).await);
        assert_eq!(repo.get(id).unwrap().execution_count, 0);
    }
}
