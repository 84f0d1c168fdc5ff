use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{ConsumptionStats, WatchedItem},
    services::{consumption_stats, get_watched, list_watched, record_watched, remove_watched},
};

use super::AppState;

pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<WatchedItem>>> {
    let items = list_watched(state.store.clone(), &user_id).await?;
    Ok(Json(items))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, String)>,
) -> AppResult<Json<WatchedItem>> {
    let item = get_watched(state.store.clone(), &user_id, &item_id).await?;
    Ok(Json(item))
}

pub async fn record(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, String)>,
    Json(item): Json<WatchedItem>,
) -> AppResult<Json<WatchedItem>> {
    let item = record_watched(state.store.clone(), &user_id, &item_id, item, state.clock.now()).await?;
    Ok(Json(item))
}

pub async fn remove(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    remove_watched(state.store.clone(), &user_id, &item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Viewing-habit statistics over everything the user has watched
pub async fn habits(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ConsumptionStats>> {
    let items = list_watched(state.store.clone(), &user_id).await?;
    Ok(Json(consumption_stats(&items)))
}
