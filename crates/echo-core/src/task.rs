//! Queued task records.

use crate::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of queued automation work.
///
/// A record's identity is its position in the persisted sequence: records
/// are only ever appended or mutated in place, never reordered or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Free-text task statement the pipeline plans against.
    pub description: String,

    /// Current lifecycle status.
    pub status: TaskStatus,

    /// When the task was submitted. Set once at intake, never modified.
    pub submitted_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Create a new pending record stamped with the current time.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            status: TaskStatus::Pending,
            submitted_at: Utc::now(),
        }
    }

    /// Check if the record is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_pending() {
        let record = TaskRecord::new("add health endpoint");
        assert_eq!(record.status, TaskStatus::Pending);
        assert_eq!(record.description, "add health endpoint");
    }

    #[test]
    fn test_record_round_trip() {
        let record = TaskRecord::new("fix typo");
        let json = serde_json::to_string(&record).unwrap();
        let back: TaskRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
