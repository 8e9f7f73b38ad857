//! Run reports.

use crate::artifacts::Artifacts;
use crate::state::SessionSnapshot;
use crate::workflow::{Stage, WorkflowState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Payment confirmed
    Done,
    /// A stage failed
    Failed,
}

/// The failing stage and what it left behind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Stage that failed
    pub stage: Stage,
    /// Error kind (see `ShopperError::kind`)
    pub kind: String,
    /// Error message
    pub message: String,
    /// Diagnostics captured at the failure
    pub artifacts: Artifacts,
}

/// Result of one workflow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier (also names the artifact directory)
    pub run_id: Uuid,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
    /// Final outcome
    pub outcome: Outcome,
    /// States entered, in order, starting from `Init`
    pub transitions: Vec<WorkflowState>,
    /// Session values at the end of the run
    pub session: SessionSnapshot,
    /// Present when `outcome` is `Failed`
    pub failure: Option<FailureReport>,
}

impl RunReport {
    /// Whether the run reached `Done`
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Done
    }

    /// Last state entered
    #[must_use]
    pub fn final_state(&self) -> WorkflowState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(WorkflowState::Init)
    }

    /// Pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn report(outcome: Outcome) -> RunReport {
        RunReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            duration_ms: 12,
            outcome,
            transitions: vec![WorkflowState::Init, WorkflowState::Loaded],
            session: SessionSnapshot::default(),
            failure: None,
        }
    }

    #[test]
    fn test_final_state_is_last_transition() {
        assert_eq!(report(Outcome::Done).final_state(), WorkflowState::Loaded);
    }

    #[test]
    fn test_json_shape() {
        let mut failed = report(Outcome::Failed);
        failed.failure = Some(FailureReport {
            stage: Stage::AddToCart,
            kind: "not_found".into(),
            message: "No product matching \"Aloe\"".into(),
            artifacts: Artifacts::default(),
        });
        let value: serde_json::Value = serde_json::from_str(&failed.to_json().unwrap()).unwrap();
        assert_eq!(value["outcome"], "failed");
        assert_eq!(value["failure"]["stage"], "add_to_cart");
        assert_eq!(value["transitions"][1], "loaded");
        assert!(!failed.is_success());
    }
}
