//! Subprocess verifier.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use echo_core::{ChangeSet, StageError, Verifier};

use crate::error::AgentError;

/// Runs a configured test command and reports its exit status.
///
/// A non-zero exit is the clean "checks failed" signal (`Ok(false)`);
/// only a failure to run the command at all is a verification error.
#[derive(Debug)]
pub struct CommandVerifier {
    program: String,
    args: Vec<String>,
    workdir: PathBuf,
}

impl CommandVerifier {
    /// Build a verifier from a whitespace-separated command line.
    pub fn from_command(
        command: &str,
        workdir: impl Into<PathBuf>,
    ) -> Result<Self, AgentError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AgentError::Config("test command is empty".to_string()))?;

        Ok(Self {
            program,
            args: parts.collect(),
            workdir: workdir.into(),
        })
    }
}

#[async_trait]
impl Verifier for CommandVerifier {
    async fn check(&self, changed: &ChangeSet) -> Result<bool, StageError> {
        info!(
            command = %self.program,
            files = changed.len(),
            "running checks"
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|err| {
                StageError::VerificationFailed(format!(
                    "could not run `{}`: {err}",
                    self.program
                ))
            })?;

        info!(success = status.success(), "checks finished");
        Ok(status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_is_rejected() {
        let err = CommandVerifier::from_command("   ", ".").unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_passing_command() {
        let verifier = CommandVerifier::from_command("true", ".").unwrap();
        assert!(verifier.check(&ChangeSet::new()).await.unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_is_a_clean_negative() {
        let verifier = CommandVerifier::from_command("false", ".").unwrap();
        assert!(!verifier.check(&ChangeSet::new()).await.unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unrunnable_command_is_an_error() {
        let verifier =
            CommandVerifier::from_command("echo-agent-no-such-binary", ".").unwrap();
        let err = verifier.check(&ChangeSet::new()).await.unwrap_err();
        assert!(matches!(err, StageError::VerificationFailed(_)));
    }
}
