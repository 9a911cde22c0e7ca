//! Every triggered query takes a generation number up front, in trigger
//! order. Only the holder of the latest generation may commit, so a slow
//! early response can never overwrite a later one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::models::FetchState;
use crate::services::{Endpoint, MovieApi, PopularityEvent};

pub struct FetchController {
    api: Arc<dyn MovieApi>,
    state: watch::Sender<FetchState>,
    generation: AtomicU64,
    closed: AtomicBool,
    events: Mutex<Option<mpsc::UnboundedSender<PopularityEvent>>>,
}

impl FetchController {
    pub fn new(
        api: Arc<dyn MovieApi>,
        events: Option<mpsc::UnboundedSender<PopularityEvent>>,
    ) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            api,
            state,
            generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            events: Mutex::new(events),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> FetchState {
        self.state.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Triggers a query and returns its generation.
    ///
    /// Must be called at the trigger site, before the fetch is handed to
    /// another task, so generations follow trigger order.
    pub fn begin_query(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.commit(generation, FetchState::Loading);
        generation
    }

    pub async fn run_query(&self, query: &str) {
        let generation = self.begin_query();
        self.complete_query(generation, query).await;
    }

    pub async fn complete_query(&self, generation: u64, query: &str) {
        if self.is_closed() || self.generation() != generation {
            return;
        }

        let endpoint = Endpoint::for_query(query);
        match self.api.fetch_movies(&endpoint).await {
            Ok(movies) => {
                let top_result = if query.is_empty() {
                    None
                } else {
                    movies.first().cloned()
                };
                let count = movies.len();

                if !self.commit(generation, FetchState::Success(movies)) {
                    debug!("Discarding stale response for generation {}", generation);
                    return;
                }
                info!("Loaded {} movies for {:?}", count, endpoint);

                if let Some(top_result) = top_result {
                    self.notify(PopularityEvent {
                        query: query.to_string(),
                        top_result,
                    });
                }
            }
            Err(e) => {
                error!("Error fetching movies for {:?}: {}", endpoint, e);
                if !self.commit(generation, FetchState::Failure(e.user_message().to_string())) {
                    debug!("Discarding stale failure for generation {}", generation);
                }
            }
        }
    }

    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut events) = self.events.lock() {
            events.take();
        }
    }

    fn commit(&self, generation: u64, next: FetchState) -> bool {
        self.state.send_if_modified(|current| {
            if self.is_closed() || self.generation() != generation {
                return false;
            }
            *current = next;
            true
        })
    }

    fn notify(&self, event: PopularityEvent) {
        let Ok(events) = self.events.lock() else {
            return;
        };
        if let Some(events) = events.as_ref() {
            if events.send(event).is_err() {
                debug!("Popularity worker is gone, dropping event");
            }
        }
    }
}
