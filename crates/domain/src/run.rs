//! Run lifecycle: one explicit state per run and the events observers see.
//!
//! ```text
//! Idle → Resolving → NoCandidates
//!                  → CandidatesReady → Executing → Completed
//!                                                → HardFailure
//!      → HardFailure (before resolution)
//! ```

use serde::{Deserialize, Serialize};

use crate::candidate::TargetCandidate;
use crate::id::{ExecutionId, RuleId};
use crate::report::LogLine;

/// Why a run was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No authenticated caller.
    Authentication,
    /// The rule could not be loaded from the backing store.
    Configuration,
    /// The rule is switched off.
    RuleInactive,
    /// The rule's actions could not be normalized.
    MalformedActions,
}

/// State of one orchestration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Resolving,
    NoCandidates,
    CandidatesReady {
        candidates: Vec<TargetCandidate>,
        selected: Option<usize>,
    },
    Executing,
    Completed {
        success_count: usize,
        error_count: usize,
    },
    HardFailure {
        kind: FailureKind,
    },
}

impl RunState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::NoCandidates => "no_candidates",
            Self::CandidatesReady { .. } => "candidates_ready",
            Self::Executing => "executing",
            Self::Completed { .. } => "completed",
            Self::HardFailure { .. } => "hard_failure",
        }
    }

    /// `true` once the run can make no further progress.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NoCandidates | Self::Completed { .. } | Self::HardFailure { .. }
        )
    }

    /// Candidates resolved for this run, empty outside `CandidatesReady`.
    #[must_use]
    pub fn candidates(&self) -> &[TargetCandidate] {
        match self {
            Self::CandidatesReady { candidates, .. } => candidates,
            _ => &[],
        }
    }

    /// The manually selected candidate, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&TargetCandidate> {
        match self {
            Self::CandidatesReady {
                candidates,
                selected: Some(index),
            } => candidates.get(*index),
            _ => None,
        }
    }
}

/// Lifecycle notifications for an observing presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    CandidatesResolved {
        rule_id: RuleId,
        count: usize,
    },
    LogLineAppended {
        rule_id: RuleId,
        line: LogLine,
    },
    RunCompleted {
        rule_id: RuleId,
        execution_id: ExecutionId,
        success_count: usize,
        error_count: usize,
    },
    RunAborted {
        rule_id: RuleId,
        kind: FailureKind,
    },
}
