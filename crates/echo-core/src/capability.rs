//! Contracts of the four pipeline stage capabilities.
//!
//! The pipeline core treats these as opaque dependencies: each may be a
//! remote model call, a subprocess, or a local heuristic. Implementations
//! live outside this crate and are wired in at composition time.

use crate::error::StageError;
use crate::plan::{ChangeSet, PlanResult, PublishHandle};
use async_trait::async_trait;

/// Turns a task description into an ordered step list.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Produce a plan for the task. Fails with
    /// [`StageError::PlanningFailed`] on any underlying error.
    async fn plan(&self, description: &str) -> Result<PlanResult, StageError>;
}

/// Applies a plan, returning the set of changed resources.
#[async_trait]
pub trait Editor: Send + Sync {
    /// Apply the plan to the workspace. An empty [`ChangeSet`] is a valid
    /// non-error outcome meaning "no applicable changes found". Fails with
    /// [`StageError::EditFailed`].
    async fn apply(&self, description: &str, plan: &PlanResult)
        -> Result<ChangeSet, StageError>;
}

/// Checks a set of changed resources.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Run checks against the changed resources. A clean `false` means the
    /// checks ran and failed; [`StageError::VerificationFailed`] is reserved
    /// for infrastructure errors (the checks could not run at all).
    async fn check(&self, changed: &ChangeSet) -> Result<bool, StageError>;
}

/// Publishes verified changes as an external change request.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish the changes. Fails with [`StageError::PublishFailed`].
    async fn publish(
        &self,
        description: &str,
        changed: &ChangeSet,
    ) -> Result<PublishHandle, StageError>;
}
