use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use super::FetchController;
use crate::config::SearchConfig;
use crate::models::{FetchState, SearchCount};
use crate::services::{spawn_popularity_worker, MovieApi, PopularityRecorder};
use crate::utils::Debouncer;

pub struct SearchSession {
    raw_query: String,
    debouncer: Debouncer<String>,
    debounced: watch::Receiver<String>,
    controller: Arc<FetchController>,
    recorder: Arc<dyn PopularityRecorder>,
    driver: JoinHandle<()>,
    popularity: Option<JoinHandle<()>>,
}

impl SearchSession {
    /// Mounts the session. The debounced query starts out empty, so the
    /// discover listing is requested right away.
    pub fn mount(
        settings: &SearchConfig,
        api: Arc<dyn MovieApi>,
        recorder: Arc<dyn PopularityRecorder>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let controller = Arc::new(FetchController::new(api, Some(events_tx)));
        let popularity = spawn_popularity_worker(recorder.clone(), events_rx);

        let (debouncer, mut settled) = Debouncer::spawn(String::new(), settings.debounce_window());
        let (debounced_tx, debounced) = watch::channel(String::new());

        let driver_controller = controller.clone();
        let driver = tokio::spawn(async move {
            let mut queries = JoinSet::new();
            spawn_query(&driver_controller, &mut queries, String::new());

            loop {
                tokio::select! {
                    next = settled.recv() => match next {
                        Some(query) => {
                            debug!("Debounced query settled on {:?}", query);
                            debounced_tx.send_replace(query.clone());
                            spawn_query(&driver_controller, &mut queries, query);
                        }
                        None => break,
                    },
                    Some(finished) = queries.join_next(), if !queries.is_empty() => {
                        if let Err(e) = finished {
                            if e.is_panic() {
                                warn!("Movie query task panicked: {}", e);
                            }
                        }
                    }
                }
            }
        });

        info!(
            "Search session mounted (debounce {}ms)",
            settings.debounce_ms
        );

        Self {
            raw_query: String::new(),
            debouncer,
            debounced,
            controller,
            recorder,
            driver,
            popularity: Some(popularity),
        }
    }

    /// Records a keystroke-level change of the search text.
    pub fn set_query(&mut self, raw: impl Into<String>) {
        self.raw_query = raw.into();
        if !self.debouncer.push(self.raw_query.clone()) {
            warn!("Debouncer stopped; ignoring query change");
        }
    }

    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    pub fn debounced_query(&self) -> String {
        self.debounced.borrow().clone()
    }

    pub fn state(&self) -> FetchState {
        self.controller.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.controller.subscribe()
    }

    /// Most searched terms. Store failures yield an empty list.
    pub async fn trending(&self, limit: usize) -> Vec<SearchCount> {
        match self.recorder.top_searches(limit).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to load trending searches: {}", e);
                Vec::new()
            }
        }
    }

    /// Unmounts the session and waits for queued popularity records to land.
    pub async fn shutdown(mut self) {
        self.unmount();
        if let Some(popularity) = self.popularity.take() {
            if let Err(e) = popularity.await {
                warn!("Popularity worker failed: {}", e);
            }
        }
        info!("Search session unmounted");
    }

    fn unmount(&mut self) {
        self.controller.shutdown();
        self.driver.abort();
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn spawn_query(controller: &Arc<FetchController>, queries: &mut JoinSet<()>, query: String) {
    let generation = controller.begin_query();
    let controller = controller.clone();
    queries.spawn(async move {
        controller.complete_query(generation, &query).await;
    });
}
