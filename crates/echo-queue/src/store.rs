//! File-backed queue store.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use echo_core::TaskRecord;

use crate::error::QueueError;

/// Durable, file-backed list of queued task records.
///
/// All mutations are whole-sequence rewrites under a single-writer lock:
/// there is no partial-record update operation. Correctness relies on
/// every writer going through this lock, not on fine-grained record
/// locking. Writes go to a sibling temp file first and are renamed over
/// the target, so a crash mid-write leaves either the old or the new
/// sequence, never a mix.
pub struct QueueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl QueueStore {
    /// Create a store backed by the given file. The file is created on
    /// first append; a missing file reads as an empty queue.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in insertion order.
    pub async fn load_all(&self) -> Result<Vec<TaskRecord>, QueueError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Append a new pending record and persist the full sequence.
    pub async fn append(&self, description: impl Into<String>) -> Result<TaskRecord, QueueError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read().await?;
        let record = TaskRecord::new(description);
        records.push(record.clone());
        self.write(&records).await?;
        debug!(index = records.len() - 1, "appended task record");
        Ok(record)
    }

    /// Overwrite the store with the given sequence.
    pub async fn save_all(&self, records: &[TaskRecord]) -> Result<(), QueueError> {
        let _guard = self.lock.lock().await;
        self.write(records).await
    }

    /// Read-modify-write the full sequence under the single-writer lock.
    ///
    /// The closure runs with the lock held, so it must not block; capability
    /// calls and other long-running work belong between `update` calls, not
    /// inside them.
    pub async fn update<T, F>(&self, f: F) -> Result<T, QueueError>
    where
        F: FnOnce(&mut Vec<TaskRecord>) -> Result<T, QueueError>,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.read().await?;
        let out = f(&mut records)?;
        self.write(&records).await?;
        Ok(out)
    }

    async fn read(&self) -> Result<Vec<TaskRecord>, QueueError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&raw).map_err(QueueError::StorageCorrupt)
    }

    async fn write(&self, records: &[TaskRecord]) -> Result<(), QueueError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let raw = serde_json::to_vec_pretty(records).map_err(QueueError::StorageCorrupt)?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_core::TaskStatus;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> QueueStore {
        QueueStore::new(dir.path().join("queue.json"))
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_then_load_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.append("first").await.unwrap();
        store.append("second").await.unwrap();

        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "first");
        assert_eq!(records[1].description, "second");
        assert!(records.iter().all(|r| r.status == TaskStatus::Pending));
        assert!(records[0].submitted_at <= records[1].submitted_at);
    }

    #[tokio::test]
    async fn test_load_all_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.append("only").await.unwrap();

        let first = store.load_all().await.unwrap();
        let second = store.load_all().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queue.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = QueueStore::new(&path);
        let err = store.load_all().await.unwrap_err();
        assert!(matches!(err, QueueError::StorageCorrupt(_)));
    }

    #[tokio::test]
    async fn test_update_persists_mutation() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.append("task").await.unwrap();

        store
            .update(|records| {
                records[0].status = TaskStatus::Running;
                Ok(())
            })
            .await
            .unwrap();

        let records = store.load_all().await.unwrap();
        assert_eq!(records[0].status, TaskStatus::Running);
    }

    #[tokio::test]
    async fn test_update_error_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.append("task").await.unwrap();

        let err = store
            .update(|records| -> Result<(), QueueError> {
                records[0].status = TaskStatus::Running;
                Err(QueueError::InvalidTask)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, QueueError::InvalidTask));

        let records = store.load_all().await.unwrap();
        assert_eq!(records[0].status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.append("task").await.unwrap();

        assert!(!dir.path().join("queue.tmp").exists());
        assert!(dir.path().join("queue.json").exists());
    }
}
