use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Movie or TV show, matching the metadata API's media types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Movie => write!(f, "movie"),
            MediaType::Tv => write!(f, "tv"),
        }
    }
}

/// A title the user has watched, with their personal rating and notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedItem {
    /// Metadata API id
    pub id: u64,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Movie runtime in minutes
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Episode runtime in minutes (TV only)
    #[serde(default)]
    pub episode_run_time: Option<u32>,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub watch_date: Option<NaiveDate>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    /// Set by the server when the item is recorded
    #[serde(default)]
    pub watched_at: Option<DateTime<Utc>>,
}

impl WatchedItem {
    /// Minutes spent on this title
    pub fn watch_minutes(&self) -> u64 {
        match self.media_type {
            MediaType::Movie => self.runtime.unwrap_or(0) as u64,
            MediaType::Tv => {
                self.episode_run_time.unwrap_or(0) as u64
                    * self.number_of_episodes.unwrap_or(0) as u64
            }
        }
    }
}

/// A title saved to watch later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub id: u64,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayCount {
    pub name: &'static str,
    pub count: usize,
}

/// Viewing-habit statistics over a user's watched items
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionStats {
    pub total_watch_time: u64,
    pub movie_watch_time: u64,
    pub show_watch_time: u64,
    /// `total_watch_time` rendered as `"{d}d {h}h {m}m"`
    pub total_watch_time_display: String,
    pub total_items: usize,
    pub movies_count: usize,
    pub shows_count: usize,
    pub favorite_count: usize,
    pub average_rating: f64,
    pub favorite_genres: Vec<GenreCount>,
    pub all_genres: Vec<GenreCount>,
    pub weekday_counts: Vec<WeekdayCount>,
}
