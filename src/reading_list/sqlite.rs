//! SQLite-backed reading list.

use super::{ReadingList, SavedItem};
use crate::error::{CurioError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS saved_items (
        id TEXT PRIMARY KEY,
        episode TEXT NOT NULL,
        reason TEXT NOT NULL,
        saved_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_saved_items_saved_at ON saved_items(saved_at);
"#;

/// SQLite-based reading list.
pub struct SqliteReadingList {
    conn: Mutex<Connection>,
}

impl SqliteReadingList {
    /// Open (or create) the reading list database at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized reading list at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| CurioError::ReadingList(format!("Failed to acquire lock: {}", e)))
    }
}

#[async_trait]
impl ReadingList for SqliteReadingList {
    #[instrument(skip(self, item))]
    async fn save(&self, item: &SavedItem) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO saved_items (id, episode, reason, saved_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                item.id.to_string(),
                item.episode,
                item.reason,
                item.saved_at.to_rfc3339(),
            ],
        )?;

        debug!("Saved {} to reading list", item.episode);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<SavedItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, episode, reason, saved_at FROM saved_items ORDER BY saved_at DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let id_str: String = row.get(0)?;
            let saved_at_str: String = row.get(3)?;
            Ok(SavedItem {
                id: Uuid::parse_str(&id_str).unwrap_or_default(),
                episode: row.get(1)?,
                reason: row.get(2)?,
                saved_at: DateTime::parse_from_rfc3339(&saved_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let items: Vec<SavedItem> = rows.filter_map(|r| r.ok()).collect();
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM saved_items WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let list = SqliteReadingList::in_memory().unwrap();
        let item = SavedItem::new("ep_003", "Long but worth it");

        list.save(&item).await.unwrap();
        let items = list.list().await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, item.id);
        assert_eq!(items[0].reason, "Long but worth it");
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reading_list.db");

        let id = {
            let list = SqliteReadingList::new(&path).unwrap();
            let item = SavedItem::new("NVIDIA: The AI Chip Wars", "weekend");
            list.save(&item).await.unwrap();
            item.id
        };

        let reopened = SqliteReadingList::new(&path).unwrap();
        let items = reopened.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);

        assert!(reopened.remove(id).await.unwrap());
        assert!(reopened.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_returns_false() {
        let list = SqliteReadingList::in_memory().unwrap();
        assert!(!list.remove(Uuid::new_v4()).await.unwrap());
    }
}
