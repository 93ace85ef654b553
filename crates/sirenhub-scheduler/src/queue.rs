//! SQLite-backed durable task queue.
//!
//! Tasks are keyed by their `not_before` deadline; `claim_ready` removes
//! ready rows inside one transaction so a task is executed at most once
//! even if the worker crashes mid-batch.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use sirenhub_core::error::{Result, SirenError};
use sirenhub_core::traits::TaskQueue;
use sirenhub_core::types::DispatchTask;

/// Durable queue over a single SQLite file.
pub struct SqliteTaskQueue {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteTaskQueue {
    /// Open or create the queue database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = rusqlite::Connection::open(path)
            .map_err(|e| SirenError::Queue(format!("DB open: {e}")))?;
        Self::migrate(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// In-memory queue, for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| SirenError::Queue(format!("DB open: {e}")))?;
        Self::migrate(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn migrate(conn: &rusqlite::Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS dispatch_tasks (
                id TEXT PRIMARY KEY,
                device_phone TEXT NOT NULL,
                payload TEXT NOT NULL,
                not_before TEXT NOT NULL,
                alert_id INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_dispatch_tasks_not_before
                ON dispatch_tasks (not_before);
            ",
        )
        .map_err(|e| SirenError::Queue(format!("Migration: {e}")))?;
        Ok(())
    }

    /// Number of tasks still waiting, for operator checks.
    pub async fn pending_count(&self) -> Result<u64> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT COUNT(*) FROM dispatch_tasks", [], |row| row.get::<_, u64>(0))
            .map_err(|e| SirenError::Queue(format!("Count: {e}")))
    }
}

#[async_trait]
impl TaskQueue for SqliteTaskQueue {
    async fn enqueue(&self, task: DispatchTask) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO dispatch_tasks
             (id, device_phone, payload, not_before, alert_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                task.id,
                task.device_phone,
                task.payload,
                task.not_before.to_rfc3339(),
                task.alert_id,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| SirenError::Queue(format!("Enqueue: {e}")))?;
        tracing::debug!("💾 Queued task {} for {} at {}", task.id, task.device_phone, task.not_before);
        Ok(())
    }

    async fn claim_ready(&self) -> Result<Vec<DispatchTask>> {
        let mut conn = self.conn.lock().await;
        let now = Utc::now().to_rfc3339();

        let tx = conn
            .transaction()
            .map_err(|e| SirenError::Queue(format!("Begin: {e}")))?;

        let tasks = {
            let mut stmt = tx
                .prepare(
                    "SELECT id, device_phone, payload, not_before, alert_id
                     FROM dispatch_tasks WHERE not_before <= ?1 ORDER BY not_before",
                )
                .map_err(|e| SirenError::Queue(format!("Select: {e}")))?;

            let rows = stmt
                .query_map([&now], |row| {
                    let not_before_str: String = row.get(3)?;
                    let not_before = DateTime::parse_from_rfc3339(&not_before_str)
                        .map(|d| d.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now());
                    Ok(DispatchTask {
                        id: row.get(0)?,
                        device_phone: row.get(1)?,
                        payload: row.get(2)?,
                        not_before,
                        alert_id: row.get(4)?,
                    })
                })
                .map_err(|e| SirenError::Queue(format!("Query: {e}")))?;

            rows.filter_map(|t| t.ok()).collect::<Vec<_>>()
        };

        for task in &tasks {
            tx.execute("DELETE FROM dispatch_tasks WHERE id = ?1", [&task.id])
                .map_err(|e| SirenError::Queue(format!("Claim: {e}")))?;
        }

        tx.commit()
            .map_err(|e| SirenError::Queue(format!("Commit: {e}")))?;
        Ok(tasks)
    }

    async fn healthcheck(&self) -> bool {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task(phone: &str, not_before: DateTime<Utc>) -> DispatchTask {
        DispatchTask::relay_off(phone, "RELAY,0#", not_before, 42)
    }

    #[tokio::test]
    async fn test_claim_only_ready_tasks() {
        let queue = SqliteTaskQueue::open_in_memory().unwrap();
        let now = Utc::now();
        queue.enqueue(task("9811000001", now - Duration::seconds(1))).await.unwrap();
        queue.enqueue(task("9811000002", now + Duration::seconds(3600))).await.unwrap();

        let ready = queue.claim_ready().await.unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].device_phone, "9811000001");
        assert_eq!(queue.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_claim_removes_tasks() {
        let queue = SqliteTaskQueue::open_in_memory().unwrap();
        queue.enqueue(task("9811000001", Utc::now() - chrono::Duration::seconds(1))).await.unwrap();

        assert_eq!(queue.claim_ready().await.unwrap().len(), 1);
        // Second claim finds nothing — at-most-once.
        assert!(queue.claim_ready().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tasks_survive_reopen() {
        let dir = std::env::temp_dir().join("sirenhub-queue-test");
        std::fs::create_dir_all(&dir).ok();
        let path = dir.join(format!("{}.db", uuid::Uuid::new_v4()));

        {
            let queue = SqliteTaskQueue::open(&path).unwrap();
            queue.enqueue(task("9811000001", Utc::now() - chrono::Duration::seconds(1))).await.unwrap();
        }

        let queue = SqliteTaskQueue::open(&path).unwrap();
        let ready = queue.claim_ready().await.unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].payload, "RELAY,0#");

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_healthcheck() {
        let queue = SqliteTaskQueue::open_in_memory().unwrap();
        assert!(queue.healthcheck().await);
    }
}
