use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{FetchError, RecordResult};
use crate::models::{MovieSummary, SearchCount};
use crate::services::{Endpoint, MovieApi, PopularityRecorder};

/// Movie API answering each query after a fixed delay. Unknown queries get
/// an empty page immediately.
#[derive(Default)]
pub struct ScriptedApi {
    responses: HashMap<String, (Duration, Vec<MovieSummary>)>,
    calls: Arc<Mutex<Vec<Endpoint>>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, query: &str, delay: Duration, movies: Vec<MovieSummary>) -> Self {
        self.responses.insert(query.to_string(), (delay, movies));
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<Endpoint>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl MovieApi for ScriptedApi {
    async fn fetch_movies(&self, endpoint: &Endpoint) -> Result<Vec<MovieSummary>, FetchError> {
        self.calls.lock().unwrap().push(endpoint.clone());
        let key = match endpoint {
            Endpoint::Discover => "",
            Endpoint::Search(query) => query.as_str(),
        };
        match self.responses.get(key) {
            Some((delay, movies)) => {
                tokio::time::sleep(*delay).await;
                Ok(movies.clone())
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Recorder keeping every call in memory.
#[derive(Default, Clone)]
pub struct RecordingRecorder {
    pub records: Arc<Mutex<Vec<(String, u64)>>>,
}

#[async_trait]
impl PopularityRecorder for RecordingRecorder {
    async fn record(&self, query: &str, top_result: &MovieSummary) -> RecordResult<()> {
        self.records
            .lock()
            .unwrap()
            .push((query.to_string(), top_result.id));
        Ok(())
    }

    async fn top_searches(&self, _limit: usize) -> RecordResult<Vec<SearchCount>> {
        Ok(Vec::new())
    }
}
