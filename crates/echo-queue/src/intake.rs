//! Inbound task intake.

use std::sync::Arc;

use tracing::info;

use echo_core::{TaskRecord, TaskStatus};

use crate::error::QueueError;
use crate::store::QueueStore;

/// Accepts new task descriptions and cooperative cancellations.
///
/// Intake only touches records the runner has not reached yet: cancelling
/// pre-empts execution when the record is still pending, and is rejected
/// once the record is running or terminal.
pub struct Intake {
    store: Arc<QueueStore>,
}

impl Intake {
    /// Create an intake over the given store.
    pub fn new(store: Arc<QueueStore>) -> Self {
        Self { store }
    }

    /// Queue a new task.
    pub async fn submit(&self, description: &str) -> Result<TaskRecord, QueueError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(QueueError::InvalidTask);
        }

        let record = self.store.append(description).await?;
        info!(task = %record.description, "task queued");
        Ok(record)
    }

    /// Cancel the pending record at `index`, returning the updated record.
    pub async fn cancel(&self, index: usize) -> Result<TaskRecord, QueueError> {
        let record = self
            .store
            .update(|records| {
                let len = records.len();
                let record = records
                    .get_mut(index)
                    .ok_or(QueueError::IndexOutOfRange { index, len })?;

                if record.status != TaskStatus::Pending {
                    return Err(QueueError::NotCancellable {
                        index,
                        status: record.status,
                    });
                }

                record.status = TaskStatus::Cancelled;
                Ok(record.clone())
            })
            .await?;

        info!(index, task = %record.description, "task cancelled");
        Ok(record)
    }

    /// Status listing: every record, in insertion order, with the last
    /// successfully persisted status.
    pub async fn list(&self) -> Result<Vec<TaskRecord>, QueueError> {
        self.store.load_all().await
    }
}
