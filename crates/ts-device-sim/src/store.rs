//! Best-effort local copy of published readings.
//!
//! The cloud side keys readings by `(deviceId, timestamp)`; the local
//! store mirrors that record shape. Writes are side calls on the publish
//! path — a failure here is logged by the caller and never affects
//! publishing or scheduling.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

use ts_protocol::TelemetryPayload;

/// A "put reading" sink keyed by `(deviceId, timestamp)`.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    async fn put_reading(&self, record: &TelemetryPayload) -> anyhow::Result<()>;
}

/// Appends each reading as one JSON line to a local file.
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReadingStore for JsonlStore {
    async fn put_reading(&self, record: &TelemetryPayload) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        Ok(())
    }
}

/// In-memory store for tests.
pub struct MemoryStore {
    records: Mutex<Vec<TelemetryPayload>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<TelemetryPayload> {
        self.records.lock().unwrap().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn put_reading(&self, record: &TelemetryPayload) -> anyhow::Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_protocol::Reading;

    fn record(timestamp: i64) -> TelemetryPayload {
        TelemetryPayload::new(
            "dev-1",
            &Reading {
                temperature: 25.5,
                humidity: 44.0,
                timestamp,
            },
        )
    }

    #[tokio::test]
    async fn jsonl_store_appends_one_line_per_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readings.jsonl");
        let store = JsonlStore::new(&path);

        store.put_reading(&record(100)).await.unwrap();
        store.put_reading(&record(105)).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: TelemetryPayload = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.device_id, "dev-1");
        assert_eq!(first.timestamp, 100);
        let second: TelemetryPayload = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.timestamp, 105);
    }

    #[tokio::test]
    async fn jsonl_store_fails_on_unwritable_path() {
        let store = JsonlStore::new("/nonexistent-dir/readings.jsonl");
        assert!(store.put_reading(&record(1)).await.is_err());
    }

    #[tokio::test]
    async fn memory_store_records_in_order() {
        let store = MemoryStore::new();
        store.put_reading(&record(1)).await.unwrap();
        store.put_reading(&record(2)).await.unwrap();

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, 1);
        assert_eq!(records[1].timestamp, 2);
    }
}
