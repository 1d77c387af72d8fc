//! Action results and the append-only run report.

use serde::{Deserialize, Serialize};

use crate::id::ExecutionId;
use crate::rule::ActionSpec;
use crate::time::Timestamp;

/// What an action executor reports for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ActionOutcome {
    #[must_use]
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Position and label of an action within its rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRef {
    pub index: usize,
    pub action_type: String,
    pub name: String,
}

impl ActionRef {
    #[must_use]
    pub fn new(index: usize, spec: &ActionSpec) -> Self {
        Self {
            index,
            action_type: spec.action_type.clone(),
            name: spec.label().to_string(),
        }
    }
}

/// Result of one (candidate, action) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action: ActionRef,
    pub candidate_key: String,
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ActionResult {
    #[must_use]
    pub fn from_outcome(action: ActionRef, candidate_key: String, outcome: ActionOutcome) -> Self {
        Self {
            action,
            candidate_key,
            success: outcome.success,
            message: outcome.message,
            error: outcome.error,
        }
    }
}

/// Severity of a log line; success and error lines render distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One line of a run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
    pub at: Timestamp,
}

impl LogLine {
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: crate::time::now(),
        }
    }
}

impl std::fmt::Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = match self.level {
            LogLevel::Info => "·",
            LogLevel::Success => "✓",
            LogLevel::Warning => "!",
            LogLevel::Error => "✗",
        };
        write!(f, "{marker} {}", self.message)
    }
}

/// Ordered log of one run plus its aggregate counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub execution_id: Option<ExecutionId>,
    pub lines: Vec<LogLine>,
    pub results: Vec<ActionResult>,
    pub success_count: usize,
    pub error_count: usize,
}

impl ExecutionReport {
    /// Total number of action invocations.
    #[must_use]
    pub fn invocations(&self) -> usize {
        self.success_count + self.error_count
    }

    /// Text of the final verdict line.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Run finished: {} succeeded, {} failed",
            self.success_count, self.error_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_copy_outcome_fields_into_result() {
        let spec = ActionSpec {
            action_type: "send_email".to_string(),
            name: String::new(),
            parameters: serde_json::json!({}),
        };
        let result = ActionResult::from_outcome(
            ActionRef::new(2, &spec),
            "client-1".to_string(),
            ActionOutcome::failed("smtp down"),
        );
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("smtp down"));
        assert_eq!(result.action.index, 2);
        assert_eq!(result.action.name, "send_email");
    }

    #[test]
    fn should_mark_lines_by_level() {
        assert!(LogLine::new(LogLevel::Success, "sent").to_string().starts_with('✓'));
        assert!(LogLine::new(LogLevel::Error, "failed").to_string().starts_with('✗'));
    }

    #[test]
    fn should_state_counts_in_summary() {
        let report = ExecutionReport {
            success_count: 3,
            error_count: 1,
            ..ExecutionReport::default()
        };
        assert_eq!(report.invocations(), 4);
        assert_eq!(report.summary(), "Run finished: 3 succeeded, 1 failed");
    }
}
