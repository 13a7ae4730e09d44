//! Execution report — the record of one rule run.

use serde::Serialize;

use crate::error::HomeError;
use crate::id::{ReportId, RuleId};
use crate::rule::Action;
use crate::time::Timestamp;

/// Overall outcome of a rule run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Condition held and every action applied.
    Completed,
    /// Condition held and at least one action failed.
    Partial,
    /// Condition did not hold; nothing was applied.
    Skipped,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Partial => f.write_str("partial"),
            Self::Skipped => f.write_str("skipped"),
        }
    }
}

/// Result of applying a single action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<HomeError>,
}

impl ActionOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-run record of the overall and per-action outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    pub id: ReportId,
    pub rule_id: RuleId,
    pub rule_name: String,
    pub executed_at: Timestamp,
    pub status: ExecutionStatus,
    pub outcomes: Vec<ActionOutcome>,
}

impl ExecutionReport {
    /// A run whose condition did not hold.
    #[must_use]
    pub fn skipped(rule_id: RuleId, rule_name: String, executed_at: Timestamp) -> Self {
        Self {
            id: ReportId::new(),
            rule_id,
            rule_name,
            executed_at,
            status: ExecutionStatus::Skipped,
            outcomes: Vec::new(),
        }
    }

    /// A run that attempted `outcomes`; the status is derived from them.
    #[must_use]
    pub fn applied(
        rule_id: RuleId,
        rule_name: String,
        executed_at: Timestamp,
        outcomes: Vec<ActionOutcome>,
    ) -> Self {
        let status = if outcomes.iter().all(ActionOutcome::succeeded) {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Partial
        };
        Self {
            id: ReportId::new(),
            rule_id,
            rule_name,
            executed_at,
            status,
            outcomes,
        }
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    /// Number of actions that applied successfully.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }
}
