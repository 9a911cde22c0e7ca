use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{PopularityBackend, PopularityConfig};
use crate::error::RecordResult;
use crate::models::{MovieSummary, SearchCount};
use crate::repositories::{RedisRepo, SearchCountRepo};
use crate::utils::poster_url;

/// A non-empty search together with its top result.
#[derive(Debug, Clone, PartialEq)]
pub struct PopularityEvent {
    pub query: String,
    pub top_result: MovieSummary,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PopularityRecorder: Send + Sync {
    async fn record(&self, query: &str, top_result: &MovieSummary) -> RecordResult<()>;

    /// Most searched terms, highest count first.
    async fn top_searches(&self, limit: usize) -> RecordResult<Vec<SearchCount>>;
}

#[derive(Clone)]
pub enum PopularityStore {
    Sqlite(SearchCountRepo),
    Redis(RedisRepo),
    Disabled,
}

impl PopularityStore {
    /// Opens the configured backend. A backend that cannot be opened is
    /// logged and replaced by `Disabled`; searching keeps working without it.
    pub async fn from_config(settings: &PopularityConfig) -> Self {
        match settings.backend {
            PopularityBackend::Sqlite if !settings.sqlite_path.trim().is_empty() => {
                let path = settings.sqlite_path.clone();
                match tokio::task::spawn_blocking(move || SearchCountRepo::new(path)).await {
                    Ok(Ok(repo)) => {
                        info!("Recording search popularity in {}", settings.sqlite_path);
                        PopularityStore::Sqlite(repo)
                    }
                    Ok(Err(e)) => {
                        warn!("Failed to open popularity database: {}", e);
                        PopularityStore::Disabled
                    }
                    Err(e) => {
                        warn!("Popularity database setup task failed: {}", e);
                        PopularityStore::Disabled
                    }
                }
            }
            PopularityBackend::Redis if !settings.redis_url.trim().is_empty() => {
                match RedisRepo::new(&settings.redis_url, &settings.redis_prefix).await {
                    Ok(repo) => {
                        info!("Recording search popularity in redis");
                        PopularityStore::Redis(repo)
                    }
                    Err(e) => {
                        warn!("Failed to connect to popularity redis: {}", e);
                        PopularityStore::Disabled
                    }
                }
            }
            PopularityBackend::None => PopularityStore::Disabled,
            backend => {
                warn!("Popularity backend {:?} selected but not configured", backend);
                PopularityStore::Disabled
            }
        }
    }
}

#[async_trait]
impl PopularityRecorder for PopularityStore {
    async fn record(&self, query: &str, top_result: &MovieSummary) -> RecordResult<()> {
        let poster = poster_url(top_result.poster_path.as_deref());
        let count = match self {
            PopularityStore::Sqlite(repo) => {
                let repo = repo.clone();
                let query = query.to_string();
                let movie_id = top_result.id;
                tokio::task::spawn_blocking(move || repo.increment(&query, movie_id, &poster))
                    .await??
            }
            PopularityStore::Redis(repo) => repo.increment(query, top_result.id, &poster).await?,
            PopularityStore::Disabled => return Ok(()),
        };
        debug!("Search '{}' now counted {} times", query, count);
        Ok(())
    }

    async fn top_searches(&self, limit: usize) -> RecordResult<Vec<SearchCount>> {
        match self {
            PopularityStore::Sqlite(repo) => {
                let repo = repo.clone();
                tokio::task::spawn_blocking(move || repo.top(limit)).await?
            }
            PopularityStore::Redis(repo) => repo.top(limit).await,
            PopularityStore::Disabled => Ok(Vec::new()),
        }
    }
}

/// Drains popularity events one at a time. Failures are logged and dropped.
pub fn spawn_popularity_worker(
    recorder: Arc<dyn PopularityRecorder>,
    mut events: mpsc::UnboundedReceiver<PopularityEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Err(e) = recorder.record(&event.query, &event.top_result).await {
                warn!("Failed to record popularity for '{}': {}", event.query, e);
            }
        }
        debug!("Popularity worker stopped");
    })
}
