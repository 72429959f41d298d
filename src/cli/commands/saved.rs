//! Saved command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::reading_list;
use anyhow::{Context, Result};
use uuid::Uuid;

/// Show the reading list, or remove one item from it.
pub async fn run_saved(remove: Option<String>, settings: Settings) -> Result<()> {
    let list = reading_list::open(&settings)?;

    if let Some(id) = remove {
        let id = Uuid::parse_str(&id).with_context(|| format!("Invalid item id: {}", id))?;
        if list.remove(id).await? {
            Output::success(&format!("Removed {}", id));
        } else {
            Output::warning(&format!("No saved item with id {}", id));
        }
        return Ok(());
    }

    let items = list.list().await?;
    if items.is_empty() {
        Output::info("Reading list is empty. The podcast agent adds items with save_for_later.");
        return Ok(());
    }

    Output::header(&format!("Reading list ({})", items.len()));
    println!();
    for item in &items {
        Output::list_item(&format!(
            "{} ({})",
            item.episode,
            item.saved_at.format("%Y-%m-%d %H:%M")
        ));
        Output::kv("Reason", &item.reason);
        Output::kv("Id", &item.id.to_string());
    }

    Ok(())
}
