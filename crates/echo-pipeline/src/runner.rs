//! Queue runner - drains pending records through the pipeline.

use std::sync::Arc;

use tracing::{info, warn};

use echo_core::TaskStatus;
use echo_queue::{QueueError, QueueStore};

use crate::pipeline::Pipeline;

/// Result of one drain pass, for CLI and chat-surface reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Records run through the pipeline.
    pub processed: usize,

    /// Records that finished `Done`.
    pub succeeded: usize,

    /// Records that finished `Error`.
    pub failed: usize,

    /// Records that left `Pending` (e.g. were cancelled) between the
    /// drain snapshot and pickup.
    pub skipped: usize,
}

/// Drains the queue store, one record at a time.
///
/// The runner is a single cooperative actor: it processes records strictly
/// sequentially and persists each status transition before touching the
/// next record, so an external reader never observes two records running
/// at once. Records appended while a drain is in flight are left for the
/// next invocation.
pub struct Runner {
    store: Arc<QueueStore>,
    pipeline: Pipeline,
}

impl Runner {
    /// Create a runner over the given store and pipeline.
    pub fn new(store: Arc<QueueStore>, pipeline: Pipeline) -> Self {
        Self { store, pipeline }
    }

    /// Process every record that is pending when the drain begins.
    ///
    /// A task's pipeline failure is recorded as `Error` and the drain moves
    /// on; only store read/write failures abort the pass.
    pub async fn drain(&self) -> Result<DrainSummary, QueueError> {
        let records = self.store.load_all().await?;
        let pending: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.status == TaskStatus::Pending)
            .map(|(index, _)| index)
            .collect();

        info!(pending = pending.len(), "draining queue");
        let mut summary = DrainSummary::default();

        for index in pending {
            // Re-check under the store lock: the record may have been
            // cancelled since the snapshot, and a cancelled record is
            // never ours to touch.
            let description = self
                .store
                .update(|records| match records.get_mut(index) {
                    Some(record) if record.status == TaskStatus::Pending => {
                        record.status = TaskStatus::Running;
                        Ok(Some(record.description.clone()))
                    }
                    _ => Ok(None),
                })
                .await?;

            let Some(description) = description else {
                summary.skipped += 1;
                continue;
            };

            info!(index, task = %description, "running task");
            let outcome = self.pipeline.run(&description).await;

            let status = if outcome.succeeded {
                summary.succeeded += 1;
                TaskStatus::Done
            } else {
                summary.failed += 1;
                TaskStatus::Error
            };
            summary.processed += 1;

            match &outcome.failure {
                Some(failure) => warn!(
                    index,
                    stage = %failure.stage,
                    reason = %failure.reason,
                    "task failed"
                ),
                None => info!(index, files = outcome.changed_resources.len(), "task done"),
            }

            self.store
                .update(|records| {
                    if let Some(record) = records.get_mut(index) {
                        record.status = status;
                    }
                    Ok(())
                })
                .await?;
        }

        Ok(summary)
    }
}

/// Reset stale `Running` records to `Pending`.
///
/// A crash between persisting `Running` and persisting the terminal status
/// leaves at most one record stuck; listing keeps reporting it as running
/// until an operator invokes this pass. Nothing runs it implicitly.
pub async fn reconcile(store: &QueueStore) -> Result<usize, QueueError> {
    let reset = store
        .update(|records| {
            let mut reset = 0;
            for (index, record) in records.iter_mut().enumerate() {
                if record.status == TaskStatus::Running {
                    warn!(index, task = %record.description, "resetting stale running task");
                    record.status = TaskStatus::Pending;
                    reset += 1;
                }
            }
            Ok(reset)
        })
        .await?;

    info!(reset, "reconcile finished");
    Ok(reset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stubs::{StubEditor, StubPlanner, StubPublisher, StubVerifier};
    use echo_core::TaskRecord;
    use echo_queue::Intake;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> Arc<QueueStore> {
        Arc::new(QueueStore::new(dir.path().join("queue.json")))
    }

    fn happy_pipeline() -> Pipeline {
        Pipeline::new(
            Arc::new(StubPlanner::with_steps(3)),
            Arc::new(StubEditor::touching(&["src/server.rs"])),
            Arc::new(StubVerifier::passing()),
            Arc::new(StubPublisher::ok()),
        )
    }

    fn no_changes_pipeline() -> Pipeline {
        Pipeline::new(
            Arc::new(StubPlanner::with_steps(1)),
            Arc::new(StubEditor::touching(&[])),
            Arc::new(StubVerifier::passing()),
            Arc::new(StubPublisher::ok()),
        )
    }

    #[tokio::test]
    async fn test_drain_empty_queue() {
        let dir = TempDir::new().unwrap();
        let runner = Runner::new(store_in(&dir), happy_pipeline());

        let summary = runner.drain().await.unwrap();
        assert_eq!(summary, DrainSummary::default());
    }

    #[tokio::test]
    async fn test_successful_task_ends_done() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let intake = Intake::new(store.clone());
        intake.submit("add health endpoint").await.unwrap();

        let runner = Runner::new(store.clone(), happy_pipeline());
        let summary = runner.drain().await.unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.succeeded, 1);
        let records = store.load_all().await.unwrap();
        assert_eq!(records[0].status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_no_changes_ends_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let intake = Intake::new(store.clone());
        intake.submit("fix typo").await.unwrap();

        let runner = Runner::new(store.clone(), no_changes_pipeline());
        let summary = runner.drain().await.unwrap();

        assert_eq!(summary.failed, 1);
        let records = store.load_all().await.unwrap();
        assert_eq!(records[0].status, TaskStatus::Error);
    }

    #[tokio::test]
    async fn test_cancelled_task_is_never_run() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let intake = Intake::new(store.clone());
        intake.submit("first").await.unwrap();
        intake.submit("second").await.unwrap();
        intake.cancel(1).await.unwrap();

        let runner = Runner::new(store.clone(), happy_pipeline());
        let summary = runner.drain().await.unwrap();

        assert_eq!(summary.processed, 1);
        let records = store.load_all().await.unwrap();
        assert_eq!(records[0].status, TaskStatus::Done);
        assert_eq!(records[1].status, TaskStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_drain() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let intake = Intake::new(store.clone());
        intake.submit("first").await.unwrap();
        intake.submit("second").await.unwrap();

        // Verifier reports clean check failures for every task.
        let pipeline = Pipeline::new(
            Arc::new(StubPlanner::with_steps(1)),
            Arc::new(StubEditor::touching(&["src/lib.rs"])),
            Arc::new(StubVerifier::failing_checks()),
            Arc::new(StubPublisher::ok()),
        );
        let runner = Runner::new(store.clone(), pipeline);
        let summary = runner.drain().await.unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 2);
        let records = store.load_all().await.unwrap();
        assert!(records.iter().all(|r| r.status == TaskStatus::Error));
    }

    #[tokio::test]
    async fn test_crash_leaves_running_until_reconciled() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        // Simulate a crash after the running transition was persisted but
        // before a terminal status was written.
        let mut record = TaskRecord::new("interrupted");
        record.status = TaskStatus::Running;
        store.save_all(&[record]).await.unwrap();

        let records = store.load_all().await.unwrap();
        assert_eq!(records[0].status, TaskStatus::Running);

        // A fresh drain does not pick the record up...
        let runner = Runner::new(store.clone(), happy_pipeline());
        let summary = runner.drain().await.unwrap();
        assert_eq!(summary.processed, 0);

        // ...until an explicit reconcile pass resets it.
        let reset = reconcile(&store).await.unwrap();
        assert_eq!(reset, 1);
        let records = store.load_all().await.unwrap();
        assert_eq!(records[0].status, TaskStatus::Pending);

        let summary = runner.drain().await.unwrap();
        assert_eq!(summary.succeeded, 1);
    }

    #[tokio::test]
    async fn test_reconcile_ignores_settled_records() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let intake = Intake::new(store.clone());
        intake.submit("pending").await.unwrap();

        let reset = reconcile(&store).await.unwrap();
        assert_eq!(reset, 0);
        let records = store.load_all().await.unwrap();
        assert_eq!(records[0].status, TaskStatus::Pending);
    }
}
