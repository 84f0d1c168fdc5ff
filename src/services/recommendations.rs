use reqwest::Client as HttpClient;
use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey, DocumentStore},
    error::{AppError, AppResult},
    models::{Candidate, RecommendPayload, RecommendationRequest, Recommendations, WatchedItem},
    services::watched::list_watched,
};

/// External content recommender
#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, payload: &RecommendPayload) -> AppResult<Recommendations>;

    /// Recommender name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Recommender reached over HTTP at `{base_url}/recommend`
#[derive(Clone)]
pub struct HttpRecommender {
    http_client: HttpClient,
    base_url: String,
}

impl HttpRecommender {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Recommender for HttpRecommender {
    async fn recommend(&self, payload: &RecommendPayload) -> AppResult<Recommendations> {
        let url = format!("{}/recommend", self.base_url);

        tracing::debug!(
            url = %url,
            favorites = payload.favorites.len(),
            discover = payload.discover.len(),
            "Calling recommendation service"
        );

        let response = self.http_client.post(&url).json(payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "Recommendation service request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Recommender returned status {}: {}",
                status, body
            )));
        }

        let recommendations: Recommendations = response.json().await?;

        tracing::info!(
            general = recommendations.general.len(),
            individual = recommendations.individual.len(),
            "Received recommendations"
        );

        Ok(recommendations)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Bag of words describing a title: description words, lowercased genres,
/// cast names, then `Director {name}` entries
pub fn build_tags(item: &WatchedItem) -> String {
    let description = item
        .description
        .as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string);
    let genres = item.genres.iter().map(|g| g.to_lowercase());
    let cast = item.cast.iter().cloned();
    let directors = item.directors.iter().map(|d| format!("Director {}", d));

    description
        .chain(genres)
        .chain(cast)
        .chain(directors)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Most recently watched favorites, newest first, as recommender candidates
pub fn favorite_candidates(mut watched: Vec<WatchedItem>, limit: usize) -> Vec<Candidate> {
    watched.retain(|item| item.favorite);
    // Undated items sort last
    watched.sort_by(|a, b| b.watch_date.cmp(&a.watch_date));

    watched
        .into_iter()
        .take(limit)
        .map(|item| Candidate {
            id: item.id,
            tags: build_tags(&item),
            title: item.title,
            poster_path: item.poster_path.unwrap_or_default(),
            release_date: item.release_date.unwrap_or_default(),
            vote_average: item.vote_average.unwrap_or_default(),
            media_type: item.media_type,
        })
        .collect()
}

/// Assembles recommendation requests and caches the results per user
pub struct RecommendationService {
    store: Arc<dyn DocumentStore>,
    recommender: Arc<dyn Recommender>,
    cache: Cache,
    cache_ttl: u64,
    favorites_limit: usize,
}

impl RecommendationService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        recommender: Arc<dyn Recommender>,
        cache: Cache,
        cache_ttl: u64,
        favorites_limit: usize,
    ) -> Self {
        Self {
            store,
            recommender,
            cache,
            cache_ttl,
            favorites_limit,
        }
    }

    /// Recommendations for a user, served from cache while fresh
    ///
    /// With no favorites there is nothing to compare against: the result is
    /// empty, the recommender is not called and nothing is cached.
    pub async fn recommend_for(
        &self,
        user_id: &str,
        request: RecommendationRequest,
    ) -> AppResult<Recommendations> {
        let watched = list_watched(self.store.clone(), user_id).await?;
        let favorites = favorite_candidates(watched, self.favorites_limit);
        if favorites.is_empty() {
            tracing::info!(user_id = %user_id, "No favorites, skipping recommender");
            return Ok(Recommendations::default());
        }

        let submitted = request.discover.len();
        let discover: Vec<Candidate> = request
            .discover
            .into_iter()
            .filter_map(|item| item.into_candidate())
            .collect();

        if discover.is_empty() {
            return Err(AppError::InvalidInput(
                "discover must contain at least one complete candidate".to_string(),
            ));
        }

        tracing::info!(
            user_id = %user_id,
            recommender = self.recommender.name(),
            favorites = favorites.len(),
            discover = discover.len(),
            dropped = submitted - discover.len(),
            "Requesting recommendations"
        );

        let payload = RecommendPayload {
            favorites,
            discover,
        };
        let key = CacheKey::Recommendations(user_id.to_string());
        let recommender = self.recommender.clone();

        cached!(self.cache, key, self.cache_ttl, async move {
            recommender.recommend(&payload).await
        })
    }
}
