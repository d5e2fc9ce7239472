//! Terminal result of one pipeline run.

use crate::plan::{ChangeSet, PublishHandle};
use std::fmt;

/// The four pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Plan,
    Edit,
    Verify,
    Publish,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Plan => "plan",
            Self::Edit => "edit",
            Self::Verify => "verify",
            Self::Publish => "publish",
        };
        write!(f, "{name}")
    }
}

/// Where and why a pipeline run stopped short.
#[derive(Debug, Clone, PartialEq)]
pub struct StageFailure {
    /// The stage that failed.
    pub stage: PipelineStage,

    /// Human-readable reason.
    pub reason: String,
}

/// Terminal result of one orchestrator run.
///
/// Created once at the end of a run and consumed by the queue runner to
/// decide the record's next status.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// Whether all four stages completed.
    pub succeeded: bool,

    /// Resources touched by the edit stage, possibly empty.
    pub changed_resources: ChangeSet,

    /// Failure details when the run stopped short.
    pub failure: Option<StageFailure>,

    /// Change-request handle when publishing succeeded.
    pub publish: Option<PublishHandle>,
}

impl PipelineOutcome {
    /// Build a successful outcome.
    pub fn success(changed_resources: ChangeSet, publish: PublishHandle) -> Self {
        Self {
            succeeded: true,
            changed_resources,
            failure: None,
            publish: Some(publish),
        }
    }

    /// Build a failed outcome for the given stage.
    pub fn failure(
        stage: PipelineStage,
        reason: impl Into<String>,
        changed_resources: ChangeSet,
    ) -> Self {
        Self {
            succeeded: false,
            changed_resources,
            failure: Some(StageFailure {
                stage,
                reason: reason.into(),
            }),
            publish: None,
        }
    }

    /// The failing stage, if the run failed.
    pub fn failure_stage(&self) -> Option<PipelineStage> {
        self.failure.as_ref().map(|f| f.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_stage_and_reason() {
        let outcome = PipelineOutcome::failure(PipelineStage::Edit, "no changes", ChangeSet::new());
        assert!(!outcome.succeeded);
        assert_eq!(outcome.failure_stage(), Some(PipelineStage::Edit));
        assert_eq!(outcome.failure.unwrap().reason, "no changes");
        assert!(outcome.publish.is_none());
    }

    #[test]
    fn test_success_carries_handle() {
        let mut changed = ChangeSet::new();
        changed.insert("src/server.rs");
        let handle = PublishHandle::new("agent-fix/1", "https://example.com/pr/1");

        let outcome = PipelineOutcome::success(changed, handle.clone());
        assert!(outcome.succeeded);
        assert_eq!(outcome.failure_stage(), None);
        assert_eq!(outcome.publish, Some(handle));
    }
}
