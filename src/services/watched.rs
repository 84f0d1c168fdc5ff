use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::{
    db::{list_documents, read_document, write_document, Collection, DocumentPath, DocumentStore},
    error::{AppError, AppResult},
    models::WatchedItem,
};

const MAX_RATING: f64 = 10.0;

/// Records a watched item, stamping when it was recorded
pub async fn record_watched(
    store: Arc<dyn DocumentStore>,
    user_id: &str,
    item_id: &str,
    mut item: WatchedItem,
    now: DateTime<Utc>,
) -> AppResult<WatchedItem> {
    if item.id.to_string() != item_id {
        return Err(AppError::InvalidInput(format!(
            "Item id {} does not match path id {}",
            item.id, item_id
        )));
    }
    if !item.rating.is_finite() || !(0.0..=MAX_RATING).contains(&item.rating) {
        return Err(AppError::InvalidInput(format!(
            "rating must be between 0 and {}",
            MAX_RATING
        )));
    }
    if item.title.trim().is_empty() {
        return Err(AppError::InvalidInput("title is required".to_string()));
    }

    item.watched_at = Some(now);

    let path = DocumentPath::watched(user_id, item_id)?;
    write_document(store.as_ref(), &path, &item).await?;

    tracing::info!(
        user_id = %user_id,
        item_id = %item_id,
        media_type = %item.media_type,
        favorite = item.favorite,
        "Watched item recorded"
    );

    Ok(item)
}

/// Every watched item for a user; malformed documents are skipped
pub async fn list_watched(
    store: Arc<dyn DocumentStore>,
    user_id: &str,
) -> AppResult<Vec<WatchedItem>> {
    let collection = Collection::watched(user_id)?;
    list_documents(store.as_ref(), &collection).await
}

pub async fn get_watched(
    store: Arc<dyn DocumentStore>,
    user_id: &str,
    item_id: &str,
) -> AppResult<WatchedItem> {
    let path = DocumentPath::watched(user_id, item_id)?;
    read_document(store.as_ref(), &path)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} is not marked as watched", item_id)))
}

/// Forgets a watched item
pub async fn remove_watched(
    store: Arc<dyn DocumentStore>,
    user_id: &str,
    item_id: &str,
) -> AppResult<()> {
    let path = DocumentPath::watched(user_id, item_id)?;
    if !store.delete(&path).await? {
        return Err(AppError::NotFound(format!(
            "Item {} is not marked as watched",
            item_id
        )));
    }

    tracing::info!(user_id = %user_id, item_id = %item_id, "Watched item removed");
    Ok(())
}
