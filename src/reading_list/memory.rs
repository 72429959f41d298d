//! In-memory reading list.
//!
//! Used for tests and when persistence is turned off.

use super::{ReadingList, SavedItem};
use crate::error::{CurioError, Result};
use async_trait::async_trait;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory reading list.
#[derive(Default)]
pub struct MemoryReadingList {
    items: RwLock<Vec<SavedItem>>,
}

impl MemoryReadingList {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(e: impl std::fmt::Display) -> CurioError {
    CurioError::ReadingList(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl ReadingList for MemoryReadingList {
    async fn save(&self, item: &SavedItem) -> Result<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.retain(|existing| existing.id != item.id);
        items.push(item.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SavedItem>> {
        let items = self.items.read().map_err(poisoned)?;
        let mut result = items.clone();
        result.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(result)
    }

    async fn remove(&self, id: Uuid) -> Result<bool> {
        let mut items = self.items.write().map_err(poisoned)?;
        let before = items.len();
        items.retain(|item| item.id != id);
        Ok(items.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_save_list_remove() {
        let list = MemoryReadingList::new();
        let mut older = SavedItem::new("ep_001", "deep dive");
        older.saved_at = Utc::now() - Duration::hours(1);
        let newer = SavedItem::new("ep_003", "weekend listen");

        list.save(&older).await.unwrap();
        list.save(&newer).await.unwrap();

        let items = list.list().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].episode, "ep_003");

        assert!(list.remove(older.id).await.unwrap());
        assert!(!list.remove(older.id).await.unwrap());
        assert_eq!(list.list().await.unwrap().len(), 1);
    }
}
