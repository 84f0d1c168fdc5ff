use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL (document store and cache)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Base URL of the external recommendation service
    #[serde(default = "default_recommender_url")]
    pub recommender_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Default number of trailing months in the history report
    #[serde(default = "default_history_months")]
    pub history_months: u32,

    /// How long recommendation results stay cached, in seconds
    #[serde(default = "default_recommendation_cache_ttl")]
    pub recommendation_cache_ttl: u64,

    /// Maximum number of favorites sent to the recommender
    #[serde(default = "default_favorites_limit")]
    pub favorites_limit: usize,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_recommender_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_history_months() -> u32 {
    6
}

fn default_recommendation_cache_ttl() -> u64 {
    1800 // 30 minutes
}

fn default_favorites_limit() -> usize {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
