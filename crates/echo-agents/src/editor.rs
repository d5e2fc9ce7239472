//! LLM-backed editor.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use echo_core::{ChangeSet, Editor, PlanResult, StageError};

use crate::llm::{strip_code_fence, ChatClient};

/// Applies a plan by asking the model for a full rewrite of each targeted
/// file.
///
/// Steps without a target, or whose target does not exist in the
/// workspace, are skipped; a run in which every step is skipped yields an
/// empty change set, which the pipeline treats as "no applicable changes",
/// not as an edit failure.
pub struct LlmEditor {
    client: ChatClient,
    workdir: PathBuf,
}

impl LlmEditor {
    /// Create an editor operating inside `workdir`.
    pub fn new(client: ChatClient, workdir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            workdir: workdir.into(),
        }
    }
}

#[async_trait]
impl Editor for LlmEditor {
    async fn apply(
        &self,
        description: &str,
        plan: &PlanResult,
    ) -> Result<ChangeSet, StageError> {
        let mut changed = ChangeSet::new();

        for step in plan.steps() {
            let Some(target) = &step.target else {
                debug!(step = %step.instruction, "step has no target, skipping");
                continue;
            };

            let path = self.workdir.join(target);
            let current = match tokio::fs::read_to_string(&path).await {
                Ok(current) => current,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    debug!(target = %target.display(), "target does not exist, skipping step");
                    continue;
                }
                Err(err) => return Err(StageError::EditFailed(err.to_string())),
            };

            let prompt = format!(
                "You are an expert developer working on this project.\n\
                 Follow the instruction and return ONLY the complete modified\n\
                 file content, ready to overwrite the file.\n\n\
                 Task: {description}\n\
                 Instruction: {}\n\
                 File: {}\n\n\
                 Current file content:\n{current}",
                step.instruction,
                target.display()
            );

            let reply = self
                .client
                .complete(&prompt)
                .await
                .map_err(|err| StageError::EditFailed(err.to_string()))?;
            let edited = strip_code_fence(&reply);

            if edited.trim().is_empty() || edited == current.trim_end() {
                debug!(target = %target.display(), "reply left file unchanged");
                continue;
            }

            tokio::fs::write(&path, edited)
                .await
                .map_err(|err| StageError::EditFailed(err.to_string()))?;
            changed.insert(target.clone());
            info!(target = %target.display(), "file rewritten");
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use echo_core::PlanStep;
    use tempfile::TempDir;

    fn offline_editor(dir: &TempDir) -> LlmEditor {
        // Points at a closed port; tests below never reach the network.
        let config = AgentConfig {
            llm_base_url: "http://127.0.0.1:9".to_string(),
            ..AgentConfig::default()
        };
        LlmEditor::new(ChatClient::new(&config), dir.path())
    }

    #[tokio::test]
    async fn test_untargeted_steps_produce_no_changes() {
        let dir = TempDir::new().unwrap();
        let editor = offline_editor(&dir);
        let plan = PlanResult::new(vec![
            PlanStep::new("review the architecture"),
            PlanStep::new("consider caching"),
        ]);

        let changed = editor.apply("task", &plan).await.unwrap();
        assert!(changed.is_empty());
    }

    #[tokio::test]
    async fn test_missing_target_is_skipped() {
        let dir = TempDir::new().unwrap();
        let editor = offline_editor(&dir);
        let plan = PlanResult::new(vec![
            PlanStep::new("edit a file that is not there").with_target("src/ghost.rs")
        ]);

        let changed = editor.apply("task", &plan).await.unwrap();
        assert!(changed.is_empty());
    }
}
