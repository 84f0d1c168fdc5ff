use serde::{Deserialize, Serialize};

use super::MediaType;

/// A title as exchanged with the recommendation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u64,
    pub title: String,
    /// Space-joined bag of words the recommender vectorizes
    pub tags: String,
    pub poster_path: String,
    pub release_date: String,
    pub vote_average: f64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
}

/// A discover-pool entry as supplied by the client; incomplete entries are dropped
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverItem {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub tags: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    #[serde(rename = "type")]
    pub media_type: Option<MediaType>,
}

impl DiscoverItem {
    /// Converts to a candidate when every field the recommender needs is present
    pub fn into_candidate(self) -> Option<Candidate> {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        Some(Candidate {
            id: self.id.filter(|id| *id != 0)?,
            title: non_empty(self.title)?,
            tags: non_empty(self.tags)?,
            poster_path: non_empty(self.poster_path)?,
            release_date: non_empty(self.release_date)?,
            vote_average: self.vote_average?,
            media_type: self.media_type.unwrap_or(MediaType::Movie),
        })
    }
}

/// Body of a recommendation request from the client
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub discover: Vec<DiscoverItem>,
}

/// Payload POSTed to the recommendation service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendPayload {
    pub favorites: Vec<Candidate>,
    pub discover: Vec<Candidate>,
}

/// Suggestions derived from a single favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualRecommendation {
    pub based_on: String,
    pub suggestions: Vec<Candidate>,
}

/// Response of the recommendation service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub general: Vec<Candidate>,
    #[serde(default)]
    pub individual: Vec<IndividualRecommendation>,
}
