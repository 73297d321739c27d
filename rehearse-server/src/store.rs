//! Session result storage
//!
//! A finished session is written once as a [`SessionResult`]. Two backends:
//! an in-memory map, and an append-only JSONL file where the latest line for
//! an id wins.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rehearse_core::{MetricsRecord, SessionId};
use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ServerError, ServerResult};

/// Everything recorded when a session ends.
///
/// Only redacted text is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub session_id: SessionId,
    pub metrics: MetricsRecord,
    pub feedback: String,
    pub redacted_transcript: String,
    pub completed_at: DateTime<Utc>,
}

/// Durable storage for session results, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a result, replacing any earlier one for the same id.
    async fn save(&self, result: &SessionResult) -> ServerResult<()>;

    /// Fetch the latest result for `id`.
    async fn get(&self, id: &SessionId) -> ServerResult<Option<SessionResult>>;
}

/// Results kept by [`MemorySessionStore::new`].
pub const DEFAULT_MEMORY_CAPACITY: usize = 1000;

/// In-memory store for development, lost on restart.
///
/// Holds at most `capacity` sessions; saving a new id past that evicts the
/// oldest one.
pub struct MemorySessionStore {
    capacity: usize,
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    results: HashMap<SessionId, SessionResult>,
    order: VecDeque<SessionId>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    /// A store holding at most `capacity` sessions (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(MemoryInner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, result: &SessionResult) -> ServerResult<()> {
        let mut inner = self.inner.write().await;
        let id = result.session_id.clone();
        if inner.results.insert(id.clone(), result.clone()).is_none() {
            inner.order.push_back(id);
        }
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                debug!(session = %oldest, "evicting session result from memory");
                inner.results.remove(&oldest);
            }
        }
        Ok(())
    }

    async fn get(&self, id: &SessionId) -> ServerResult<Option<SessionResult>> {
        Ok(self.inner.read().await.results.get(id).cloned())
    }
}

/// JSONL file-based session store
pub struct JsonlSessionStore {
    path: PathBuf,
}

impl JsonlSessionStore {
    /// Create a store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_dir(&self) -> ServerResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ServerError::Storage(format!("failed to create storage dir: {}", e))
            })?;
        }
        Ok(())
    }

    fn parse_line(line: &str) -> Option<SessionResult> {
        if line.trim().is_empty() {
            return None;
        }
        serde_json::from_str(line).ok()
    }
}

#[async_trait]
impl SessionStore for JsonlSessionStore {
    async fn save(&self, result: &SessionResult) -> ServerResult<()> {
        self.ensure_parent_dir().await?;

        let mut json = serde_json::to_string(result)
            .map_err(|e| ServerError::Storage(format!("failed to serialize result: {}", e)))?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ServerError::Storage(format!("failed to open session log: {}", e)))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(|e| ServerError::Storage(format!("failed to write result: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| ServerError::Storage(format!("failed to flush: {}", e)))?;

        Ok(())
    }

    async fn get(&self, id: &SessionId) -> ServerResult<Option<SessionResult>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)
            .await
            .map_err(|e| ServerError::Storage(format!("failed to open session log: {}", e)))?;

        let mut lines = BufReader::new(file).lines();
        let mut latest = None;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| ServerError::Storage(format!("failed to read line: {}", e)))?
        {
            let Some(result) = Self::parse_line(&line) else {
                continue;
            };
            if &result.session_id == id {
                latest = Some(result);
            }
        }

        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn result(id: &str, feedback: &str) -> SessionResult {
        SessionResult {
            session_id: SessionId::new(id),
            metrics: MetricsRecord::default(),
            feedback: feedback.to_string(),
            redacted_transcript: "Trainee: hi".to_string(),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_result_is_camel_case() {
        let json = serde_json::to_value(result("s1", "ok")).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert!(json.get("redactedTranscript").is_some());
        assert!(json.get("completedAt").is_some());
        assert_eq!(json["metrics"]["confidenceScore"], 50);
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip_and_overwrite() {
        let store = MemorySessionStore::new();
        assert!(store.get(&SessionId::new("s1")).await.unwrap().is_none());

        store.save(&result("s1", "first")).await.unwrap();
        store.save(&result("s1", "second")).await.unwrap();

        let found = store.get(&SessionId::new("s1")).await.unwrap().unwrap();
        assert_eq!(found.feedback, "second");
    }

    #[tokio::test]
    async fn test_memory_store_evicts_oldest_past_capacity() {
        let store = MemorySessionStore::with_capacity(2);
        store.save(&result("s1", "a")).await.unwrap();
        store.save(&result("s2", "b")).await.unwrap();
        // Overwriting does not take a new slot.
        store.save(&result("s1", "a2")).await.unwrap();
        store.save(&result("s3", "c")).await.unwrap();

        assert!(store.get(&SessionId::new("s1")).await.unwrap().is_none());
        assert!(store.get(&SessionId::new("s2")).await.unwrap().is_some());
        assert!(store.get(&SessionId::new("s3")).await.unwrap().is_some());
        assert_eq!(MemorySessionStore::new().capacity(), DEFAULT_MEMORY_CAPACITY);
    }

    #[tokio::test]
    async fn test_jsonl_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonlSessionStore::new(dir.path().join("nope.jsonl"));
        assert!(store.get(&SessionId::new("s1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_jsonl_latest_line_wins() {
        let dir = TempDir::new().unwrap();
        let store = JsonlSessionStore::new(dir.path().join("nested/sessions.jsonl"));

        store.save(&result("s1", "first")).await.unwrap();
        store.save(&result("s2", "other")).await.unwrap();
        store.save(&result("s1", "second")).await.unwrap();

        let found = store.get(&SessionId::new("s1")).await.unwrap().unwrap();
        assert_eq!(found.feedback, "second");
        let other = store.get(&SessionId::new("s2")).await.unwrap().unwrap();
        assert_eq!(other.feedback, "other");

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_jsonl_skips_corrupt_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.jsonl");
        let store = JsonlSessionStore::new(&path);

        store.save(&result("s1", "kept")).await.unwrap();
        let mut contents = std::fs::read_to_string(&path).unwrap();
        contents.push_str("{not json\n\n");
        std::fs::write(&path, contents).unwrap();

        let found = store.get(&SessionId::new("s1")).await.unwrap().unwrap();
        assert_eq!(found.feedback, "kept");
    }
}
