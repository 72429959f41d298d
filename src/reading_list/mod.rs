//! Reading list storage for episodes saved by the podcast agent.
//!
//! Provides a trait-based interface with SQLite and in-memory backends.

mod memory;
mod sqlite;

pub use memory::MemoryReadingList;
pub use sqlite::SqliteReadingList;

use crate::config::{ReadingListProvider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// An episode saved for later review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItem {
    pub id: Uuid,
    /// Episode id (mock mode) or title (live mode).
    pub episode: String,
    /// Why the agent saved it.
    pub reason: String,
    pub saved_at: DateTime<Utc>,
}

impl SavedItem {
    pub fn new(episode: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            episode: episode.into(),
            reason: reason.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Trait for reading list backends.
#[async_trait]
pub trait ReadingList: Send + Sync {
    /// Store an item.
    async fn save(&self, item: &SavedItem) -> Result<()>;

    /// All items, newest first.
    async fn list(&self) -> Result<Vec<SavedItem>>;

    /// Remove an item by id. Returns whether it existed.
    async fn remove(&self, id: Uuid) -> Result<bool>;
}

/// Open the reading list backend selected in settings.
pub fn open(settings: &Settings) -> Result<Arc<dyn ReadingList>> {
    match settings.reading_list.provider {
        ReadingListProvider::Sqlite => Ok(Arc::new(SqliteReadingList::new(
            &settings.reading_list_path(),
        )?)),
        ReadingListProvider::Memory => Ok(Arc::new(MemoryReadingList::new())),
    }
}
