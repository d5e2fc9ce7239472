//! Task lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a queued task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task submitted but not yet picked up by the runner.
    #[default]
    Pending,
    /// Task is currently being executed by the pipeline.
    Running,
    /// Pipeline completed all four stages successfully.
    Done,
    /// Pipeline failed at some stage.
    Error,
    /// Task was cancelled before the runner reached it.
    Cancelled,
}

impl TaskStatus {
    /// Returns true if the task is in a terminal state.
    ///
    /// `Running` is not terminal even though a crash can leave a record
    /// stuck there; recovery is an explicit reconciliation pass.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error | Self::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}
