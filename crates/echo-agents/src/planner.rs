//! LLM-backed planner.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use echo_core::{PlanResult, PlanStep, Planner, StageError};

use crate::error::AgentError;
use crate::llm::{strip_code_fence, ChatClient};

/// Directories never included in planning context.
const SKIP_DIRS: &[&str] = &["target", "node_modules", ".git", "dist", "build"];

/// How many files of context to show the model.
const MAX_CONTEXT_FILES: usize = 20;

/// How much of each file to quote.
const SNIPPET_LEN: usize = 500;

/// Plans a task by asking the model for a structured step list.
///
/// The model is instructed to answer with a JSON array of
/// `{instruction, target}` objects; all parsing of model output into
/// structure happens here, at the planning boundary, so downstream stages
/// receive explicit targets instead of re-deriving them from prose.
pub struct LlmPlanner {
    client: ChatClient,
    workdir: PathBuf,
}

impl LlmPlanner {
    /// Create a planner over the given chat client, gathering context from
    /// `workdir`.
    pub fn new(client: ChatClient, workdir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            workdir: workdir.into(),
        }
    }

    fn prompt(&self, description: &str) -> String {
        let context = gather_context(&self.workdir);
        debug!(context_len = context.len(), "planning context gathered");
        format!(
            "Analyze and plan this development task: \"{description}\"\n\n\
             Current codebase context:\n{context}\n\
             Respond with ONLY a JSON array of steps. Each step is an object\n\
             with an \"instruction\" string and a \"target\" field naming the\n\
             file the step applies to, relative to the project root, or null\n\
             when the step touches no file. Order the steps so they can be\n\
             applied one after another."
        )
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, description: &str) -> Result<PlanResult, StageError> {
        let reply = self
            .client
            .complete(&self.prompt(description))
            .await
            .map_err(|err| StageError::PlanningFailed(err.to_string()))?;

        let plan =
            parse_plan(&reply).map_err(|err| StageError::PlanningFailed(err.to_string()))?;
        info!(steps = plan.len(), "plan parsed");
        Ok(plan)
    }
}

#[derive(Deserialize)]
struct RawStep {
    instruction: String,
    #[serde(default)]
    target: Option<PathBuf>,
}

/// Parse the model reply into a plan. Tolerates a fenced ```json block.
fn parse_plan(reply: &str) -> Result<PlanResult, AgentError> {
    let body = strip_code_fence(reply);
    let steps: Vec<RawStep> = serde_json::from_str(body).map_err(|err| {
        AgentError::MalformedResponse(format!("plan is not a JSON step array: {err}"))
    })?;

    Ok(PlanResult::new(
        steps
            .into_iter()
            .map(|step| PlanStep {
                instruction: step.instruction,
                target: step.target,
            })
            .collect(),
    ))
}

/// Collect a bounded snippet sample of the workspace for the prompt.
fn gather_context(root: &Path) -> String {
    let mut snippets = Vec::new();
    walk(root, root, &mut snippets);
    if snippets.is_empty() {
        return "(no source files found)\n".to_string();
    }
    snippets.join("\n")
}

fn walk(root: &Path, dir: &Path, snippets: &mut Vec<String>) {
    if snippets.len() >= MAX_CONTEXT_FILES {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        if snippets.len() >= MAX_CONTEXT_FILES {
            break;
        }
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if path.is_dir() {
            if !SKIP_DIRS.contains(&name.as_ref()) && !name.starts_with('.') {
                walk(root, &path, snippets);
            }
            continue;
        }

        let source_like = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("rs" | "ts" | "js" | "toml" | "json")
        );
        if !source_like {
            continue;
        }

        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let snippet: String = content.chars().take(SNIPPET_LEN).collect();
        let truncated = content.chars().count() > SNIPPET_LEN;
        let shown = path.strip_prefix(root).unwrap_or(&path);
        let ellipsis = if truncated { "..." } else { "" };
        snippets.push(format!("File: {}\n{snippet}{ellipsis}\n---", shown.display()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let reply = r#"[
            {"instruction": "add /health route", "target": "src/server.rs"},
            {"instruction": "document the endpoint", "target": null}
        ]"#;

        let plan = parse_plan(reply).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan.steps()[0].target.as_deref(),
            Some(Path::new("src/server.rs"))
        );
        assert_eq!(plan.steps()[1].target, None);
    }

    #[test]
    fn test_parse_fenced_array() {
        let reply = "```json\n[{\"instruction\": \"do it\", \"target\": \"a.rs\"}]\n```";
        let plan = parse_plan(reply).unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_missing_target_defaults_to_none() {
        let plan = parse_plan(r#"[{"instruction": "think about it"}]"#).unwrap();
        assert_eq!(plan.steps()[0].target, None);
    }

    #[test]
    fn test_prose_reply_is_rejected() {
        let err = parse_plan("Sure! Here is my plan:\n1. Edit server.rs").unwrap_err();
        assert!(matches!(err, AgentError::MalformedResponse(_)));
    }

    #[test]
    fn test_gather_context_skips_hidden_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/config"), "[core]").unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();

        let context = gather_context(dir.path());
        assert!(context.contains("main.rs"));
        assert!(!context.contains("config"));
    }
}
