//! Queue store and intake errors.

use echo_core::TaskStatus;
use thiserror::Error;

/// Errors from the queue store and intake operations.
///
/// Storage-level failures (`StorageCorrupt`, `Io`) are fatal to the call
/// that hit them: queue integrity cannot be guaranteed after a partial
/// read or write, so they surface to the caller instead of being retried.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Task description is empty after trimming whitespace.
    #[error("task description is empty")]
    InvalidTask,

    /// No record at the given index.
    #[error("no task at index {index} (queue holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Only pending records can be cancelled.
    #[error("task at index {index} is {status}, only pending tasks can be cancelled")]
    NotCancellable { index: usize, status: TaskStatus },

    /// The persisted queue content could not be parsed.
    #[error("queue store is corrupt: {0}")]
    StorageCorrupt(#[source] serde_json::Error),

    /// I/O failure reading or writing the queue file.
    #[error("queue store I/O error: {0}")]
    Io(#[from] std::io::Error),
}
