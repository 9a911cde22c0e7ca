use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    #[validate]
    pub tmdb: TmdbConfig,
    #[validate]
    pub search: SearchConfig,
    #[validate]
    pub popularity: PopularityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TmdbConfig {
    #[validate(url)]
    pub base_url: String,
    /// Bearer token. Empty means requests go out unauthenticated and fail upstream.
    pub api_key: String,
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchConfig {
    #[validate(range(min = 1, max = 60_000))]
    pub debounce_ms: u64,
    #[validate(range(min = 1, max = 100))]
    pub trending_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopularityBackend {
    Sqlite,
    Redis,
    None,
}

impl FromStr for PopularityBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(PopularityBackend::Sqlite),
            "redis" => Ok(PopularityBackend::Redis),
            "none" | "off" | "" => Ok(PopularityBackend::None),
            other => Err(anyhow::anyhow!("unknown popularity backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PopularityConfig {
    pub backend: PopularityBackend,
    pub sqlite_path: String,
    pub redis_url: String,
    #[validate(length(min = 1))]
    pub redis_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb: TmdbConfig {
                base_url: "https://api.themoviedb.org/3".to_string(),
                api_key: String::new(),
                timeout_secs: 10,
            },
            search: SearchConfig {
                debounce_ms: 500,
                trending_limit: 5,
            },
            popularity: PopularityConfig {
                backend: PopularityBackend::Sqlite,
                sqlite_path: "data/popularity.db".to_string(),
                redis_url: String::new(),
                redis_prefix: "movie_finder".to_string(),
            },
        }
    }
}

impl SearchConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl TmdbConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source, overlaying defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        // TMDB configuration
        if let Some(base_url) = lookup("TMDB_API_BASE") {
            config.tmdb.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(api_key) = lookup("TMDB_API_KEY") {
            config.tmdb.api_key = api_key.trim().to_string();
        }
        if let Some(timeout_secs) = lookup("TMDB_TIMEOUT_SECS") {
            config.tmdb.timeout_secs = timeout_secs.parse()?;
        }

        // Search configuration
        if let Some(debounce_ms) = lookup("SEARCH_DEBOUNCE_MS") {
            config.search.debounce_ms = debounce_ms.parse()?;
        }
        if let Some(trending_limit) = lookup("TRENDING_LIMIT") {
            config.search.trending_limit = trending_limit.parse()?;
        }

        // Popularity configuration
        if let Some(backend) = lookup("POPULARITY_BACKEND") {
            config.popularity.backend = backend.parse()?;
        }
        if let Some(sqlite_path) = lookup("POPULARITY_SQLITE_PATH") {
            config.popularity.sqlite_path = sqlite_path;
        }
        if let Some(redis_url) = lookup("POPULARITY_REDIS_URL") {
            config.popularity.redis_url = redis_url;
        }
        if let Some(redis_prefix) = lookup("POPULARITY_REDIS_PREFIX") {
            config.popularity.redis_prefix = redis_prefix;
        }

        config.validate()?;

        if config.tmdb.api_key.is_empty() {
            warn!("TMDB_API_KEY is not set; movie requests will be rejected upstream");
        }

        Ok(config)
    }
}
