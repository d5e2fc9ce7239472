//! Pipeline orchestrator.

use std::sync::Arc;

use tracing::{info, warn};

use echo_core::{
    ChangeSet, Editor, PipelineOutcome, PipelineStage, Planner, Publisher, Verifier,
};

/// Runs the four stages in sequence for one task.
///
/// The pipeline is strictly linear: no retry, no backtrack, and no rollback
/// of already-applied edits. The first failing stage terminates the run
/// with an outcome carrying the failing stage and reason. Stage capability
/// errors are folded into the outcome here and never propagate, so one
/// task's failure cannot abort the caller's processing of later tasks.
pub struct Pipeline {
    planner: Arc<dyn Planner>,
    editor: Arc<dyn Editor>,
    verifier: Arc<dyn Verifier>,
    publisher: Arc<dyn Publisher>,
}

impl Pipeline {
    /// Create a pipeline over the four stage capabilities.
    pub fn new(
        planner: Arc<dyn Planner>,
        editor: Arc<dyn Editor>,
        verifier: Arc<dyn Verifier>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            planner,
            editor,
            verifier,
            publisher,
        }
    }

    /// Run one task through plan → edit → verify → publish.
    pub async fn run(&self, description: &str) -> PipelineOutcome {
        // Stage 1: plan.
        let plan = match self.planner.plan(description).await {
            Ok(plan) => plan,
            Err(err) => {
                return PipelineOutcome::failure(PipelineStage::Plan, err.reason(), ChangeSet::new())
            }
        };
        if plan.is_empty() {
            return PipelineOutcome::failure(
                PipelineStage::Plan,
                "planner returned no steps",
                ChangeSet::new(),
            );
        }
        info!(steps = plan.len(), "plan ready");

        // Stage 2: edit.
        let changed = match self.editor.apply(description, &plan).await {
            Ok(changed) => changed,
            Err(err) => {
                return PipelineOutcome::failure(PipelineStage::Edit, err.reason(), ChangeSet::new())
            }
        };
        if changed.is_empty() {
            // Nothing to verify or publish.
            warn!("editor found no applicable changes");
            return PipelineOutcome::failure(PipelineStage::Edit, "no changes", changed);
        }
        info!(files = changed.len(), "edits applied");

        // Stage 3: verify. A clean negative result is the normal "tests
        // failed" signal, not an infrastructure error.
        match self.verifier.check(&changed).await {
            Ok(true) => info!("checks passed"),
            Ok(false) => {
                return PipelineOutcome::failure(PipelineStage::Verify, "checks failed", changed)
            }
            Err(err) => {
                return PipelineOutcome::failure(PipelineStage::Verify, err.reason(), changed)
            }
        }

        // Stage 4: publish.
        match self.publisher.publish(description, &changed).await {
            Ok(handle) => {
                info!(branch = %handle.branch, url = %handle.url, "change request published");
                PipelineOutcome::success(changed, handle)
            }
            Err(err) => PipelineOutcome::failure(PipelineStage::Publish, err.reason(), changed),
        }
    }
}
