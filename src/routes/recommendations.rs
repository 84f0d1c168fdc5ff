use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{RecommendationRequest, Recommendations},
};

use super::AppState;

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Recommendations>> {
    let recommendations = state.recommendations.recommend_for(&user_id, request).await?;
    Ok(Json(recommendations))
}
