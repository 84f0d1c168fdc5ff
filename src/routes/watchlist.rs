use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::WatchlistItem,
    services::{add_to_watchlist, get_watchlist_item, list_watchlist, remove_from_watchlist},
};

use super::AppState;

pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<WatchlistItem>>> {
    let items = list_watchlist(state.store.clone(), &user_id).await?;
    Ok(Json(items))
}

/// Doubles as the "is it on my watchlist" check: 404 when absent
pub async fn get_item(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, String)>,
) -> AppResult<Json<WatchlistItem>> {
    let item = get_watchlist_item(state.store.clone(), &user_id, &item_id).await?;
    Ok(Json(item))
}

pub async fn add(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, String)>,
    Json(item): Json<WatchlistItem>,
) -> AppResult<(StatusCode, Json<WatchlistItem>)> {
    let item =
        add_to_watchlist(state.store.clone(), &user_id, &item_id, item, state.clock.now()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    remove_from_watchlist(state.store.clone(), &user_id, &item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
