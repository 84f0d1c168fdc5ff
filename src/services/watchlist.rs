use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::{
    db::{list_documents, read_document, write_document, Collection, DocumentPath, DocumentStore},
    error::{AppError, AppResult},
    models::WatchlistItem,
};

/// Saves a title to watch later; a title can only be listed once
pub async fn add_to_watchlist(
    store: Arc<dyn DocumentStore>,
    user_id: &str,
    item_id: &str,
    mut item: WatchlistItem,
    now: DateTime<Utc>,
) -> AppResult<WatchlistItem> {
    if item.id.to_string() != item_id {
        return Err(AppError::InvalidInput(format!(
            "Item id {} does not match path id {}",
            item.id, item_id
        )));
    }
    if item.title.trim().is_empty() {
        return Err(AppError::InvalidInput("title is required".to_string()));
    }

    let path = DocumentPath::watchlist(user_id, item_id)?;
    if store.get(&path).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Item {} is already in the watchlist",
            item_id
        )));
    }

    item.added_at = Some(now);
    write_document(store.as_ref(), &path, &item).await?;

    tracing::info!(user_id = %user_id, item_id = %item_id, "Added to watchlist");

    Ok(item)
}

pub async fn get_watchlist_item(
    store: Arc<dyn DocumentStore>,
    user_id: &str,
    item_id: &str,
) -> AppResult<WatchlistItem> {
    let path = DocumentPath::watchlist(user_id, item_id)?;
    read_document(store.as_ref(), &path)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} is not in the watchlist", item_id)))
}

pub async fn list_watchlist(
    store: Arc<dyn DocumentStore>,
    user_id: &str,
) -> AppResult<Vec<WatchlistItem>> {
    let collection = Collection::watchlist(user_id)?;
    list_documents(store.as_ref(), &collection).await
}

pub async fn remove_from_watchlist(
    store: Arc<dyn DocumentStore>,
    user_id: &str,
    item_id: &str,
) -> AppResult<()> {
    let path = DocumentPath::watchlist(user_id, item_id)?;
    if !store.delete(&path).await? {
        return Err(AppError::NotFound(format!(
            "Item {} is not in the watchlist",
            item_id
        )));
    }

    tracing::info!(user_id = %user_id, item_id = %item_id, "Removed from watchlist");
    Ok(())
}
