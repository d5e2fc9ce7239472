//! Stage capability errors.

use crate::PipelineStage;
use thiserror::Error;

/// Failure of a stage capability.
///
/// These are caught at the orchestrator boundary and folded into a
/// [`crate::PipelineOutcome`]; they never propagate out of a pipeline run.
#[derive(Debug, Error)]
pub enum StageError {
    /// The planner could not produce a plan.
    #[error("planning failed: {0}")]
    PlanningFailed(String),

    /// The editor could not apply the plan.
    #[error("edit failed: {0}")]
    EditFailed(String),

    /// The verifier could not run its checks at all. A clean negative
    /// check result is reported as `Ok(false)`, not as this error.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// The publisher could not produce a change request.
    #[error("publish failed: {0}")]
    PublishFailed(String),
}

impl StageError {
    /// The stage this error belongs to.
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::PlanningFailed(_) => PipelineStage::Plan,
            Self::EditFailed(_) => PipelineStage::Edit,
            Self::VerificationFailed(_) => PipelineStage::Verify,
            Self::PublishFailed(_) => PipelineStage::Publish,
        }
    }

    /// The underlying reason, without the stage prefix.
    pub fn reason(&self) -> &str {
        match self {
            Self::PlanningFailed(reason)
            | Self::EditFailed(reason)
            | Self::VerificationFailed(reason)
            | Self::PublishFailed(reason) => reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_maps_to_stage() {
        assert_eq!(
            StageError::PlanningFailed("timeout".into()).stage(),
            PipelineStage::Plan
        );
        assert_eq!(
            StageError::PublishFailed("403".into()).stage(),
            PipelineStage::Publish
        );
    }

    #[test]
    fn test_reason_strips_prefix() {
        let err = StageError::VerificationFailed("no test runner".into());
        assert_eq!(err.reason(), "no test runner");
        assert_eq!(err.to_string(), "verification failed: no test runner");
    }
}
