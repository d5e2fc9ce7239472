//! Agent configuration.

use std::path::PathBuf;

/// Configuration for the default stage capabilities.
///
/// Every field can be overridden through `ECHO_*` environment variables
/// (plus `GITHUB_TOKEN` for the publisher).
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model name sent to the chat endpoint.
    pub model: String,

    /// Base URL of an OpenAI-compatible chat-completions API.
    pub llm_base_url: String,

    /// Bearer token for the chat endpoint, if it needs one.
    pub llm_api_key: Option<String>,

    /// Token for the GitHub REST API.
    pub github_token: Option<String>,

    /// Owner of the repository pull requests are opened against.
    pub repo_owner: String,

    /// Name of the repository pull requests are opened against.
    pub repo_name: String,

    /// Branch pull requests target.
    pub base_branch: String,

    /// Prefix for generated branch names.
    pub branch_prefix: String,

    /// Command the verifier runs, split on whitespace.
    pub test_command: String,

    /// Workspace the editor, verifier, and publisher operate in.
    pub workdir: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            llm_base_url: "http://localhost:11434/v1".to_string(),
            llm_api_key: None,
            github_token: None,
            repo_owner: "echo-labs".to_string(),
            repo_name: "echo".to_string(),
            base_branch: "main".to_string(),
            branch_prefix: "agent-fix/".to_string(),
            test_command: "cargo test".to_string(),
            workdir: PathBuf::from("."),
        }
    }
}

impl AgentConfig {
    /// Load the configuration from the environment, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            model: env_or("ECHO_MODEL", default.model),
            llm_base_url: env_or("ECHO_LLM_BASE_URL", default.llm_base_url),
            llm_api_key: std::env::var("ECHO_LLM_API_KEY").ok(),
            github_token: std::env::var("GITHUB_TOKEN").ok(),
            repo_owner: env_or("ECHO_REPO_OWNER", default.repo_owner),
            repo_name: env_or("ECHO_REPO_NAME", default.repo_name),
            base_branch: env_or("ECHO_BASE_BRANCH", default.base_branch),
            branch_prefix: env_or("ECHO_BRANCH_PREFIX", default.branch_prefix),
            test_command: env_or("ECHO_TEST_COMMAND", default.test_command),
            workdir: std::env::var("ECHO_WORKDIR")
                .map(PathBuf::from)
                .unwrap_or(default.workdir),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}
