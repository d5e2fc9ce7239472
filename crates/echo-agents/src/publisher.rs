//! Git + GitHub pull-request publisher.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use echo_core::{ChangeSet, PublishHandle, Publisher, StageError};

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::llm::ChatClient;

/// Publishes verified changes as a GitHub pull request.
///
/// Creates a timestamped branch, stages exactly the changed paths,
/// commits, pushes, and opens a pull request against the configured base
/// branch. The PR body is a short model-written summary of the change,
/// falling back to the file list when the model is unavailable.
pub struct GitPublisher {
    chat: ChatClient,
    http: reqwest::Client,
    token: Option<String>,
    repo_owner: String,
    repo_name: String,
    base_branch: String,
    branch_prefix: String,
    workdir: PathBuf,
}

impl GitPublisher {
    /// Create a publisher from the agent configuration.
    pub fn new(config: &AgentConfig, chat: ChatClient) -> Self {
        Self {
            chat,
            http: reqwest::Client::new(),
            token: config.github_token.clone(),
            repo_owner: config.repo_owner.clone(),
            repo_name: config.repo_name.clone(),
            base_branch: config.base_branch.clone(),
            branch_prefix: config.branch_prefix.clone(),
            workdir: config.workdir.clone(),
        }
    }

    async fn git<I, S>(&self, args: I) -> Result<(), AgentError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_os_string())
            .collect();

        let output = tokio::process::Command::new("git")
            .args(&args)
            .current_dir(&self.workdir)
            .output()
            .await?;

        if !output.status.success() {
            let shown: Vec<_> = args.iter().map(|arg| arg.to_string_lossy()).collect();
            return Err(AgentError::CommandFailed(format!(
                "git {}: {}",
                shown.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    async fn summarize(&self, description: &str, changed: &ChangeSet) -> String {
        let files: Vec<String> = changed
            .iter()
            .map(|path| path.display().to_string())
            .collect();
        let prompt = format!(
            "Write a 3-5 line pull request description, plain prose, no\n\
             markdown headers, for this change.\n\n\
             Task: {description}\n\
             Files changed:\n{}",
            files.join("\n")
        );

        match self.chat.complete(&prompt).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => format!("Automated change for: {description}\n\nFiles:\n{}", files.join("\n")),
            Err(err) => {
                warn!(error = %err, "summary generation failed, using file list");
                format!("Automated change for: {description}\n\nFiles:\n{}", files.join("\n"))
            }
        }
    }

    async fn open_pull_request(
        &self,
        title: &str,
        branch: &str,
        body: &str,
    ) -> Result<String, AgentError> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/pulls",
            self.repo_owner, self.repo_name
        );

        let request = CreatePull {
            title,
            head: branch,
            base: &self.base_branch,
            body,
        };

        let mut call = self
            .http
            .post(&url)
            .header(reqwest::header::USER_AGENT, "echo-agent")
            .json(&request);
        if let Some(token) = &self.token {
            call = call.bearer_auth(token);
        }

        let response = call.send().await?;
        if !response.status().is_success() {
            return Err(AgentError::Endpoint(response.status()));
        }

        let created: CreatedPull = response.json().await?;
        Ok(created.html_url)
    }
}

#[async_trait]
impl Publisher for GitPublisher {
    async fn publish(
        &self,
        description: &str,
        changed: &ChangeSet,
    ) -> Result<PublishHandle, StageError> {
        let to_stage_error = |err: AgentError| StageError::PublishFailed(err.to_string());

        let branch = format!("{}{}", self.branch_prefix, Utc::now().timestamp_millis());
        info!(branch = %branch, files = changed.len(), "publishing changes");

        self.git(["checkout", "-b", branch.as_str()])
            .await
            .map_err(to_stage_error)?;

        let mut add: Vec<OsString> = vec!["add".into(), "--".into()];
        add.extend(changed.iter().map(|path| path.as_os_str().to_os_string()));
        self.git(add).await.map_err(to_stage_error)?;

        let title = format!("agent: {description}");
        self.git(["commit", "-m", title.as_str()])
            .await
            .map_err(to_stage_error)?;
        self.git(["push", "--set-upstream", "origin", branch.as_str()])
            .await
            .map_err(to_stage_error)?;

        let body = self.summarize(description, changed).await;
        let url = self
            .open_pull_request(&title, &branch, &body)
            .await
            .map_err(to_stage_error)?;

        info!(url = %url, "pull request opened");
        Ok(PublishHandle::new(branch, url))
    }
}

#[derive(Serialize)]
struct CreatePull<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct CreatedPull {
    html_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_pull_shape() {
        let raw = r#"{"html_url": "https://github.com/echo-labs/echo/pull/7", "number": 7}"#;
        let created: CreatedPull = serde_json::from_str(raw).unwrap();
        assert_eq!(created.html_url, "https://github.com/echo-labs/echo/pull/7");
    }
}
