pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use controller::{FetchController, SearchSession};
pub use error::{FetchError, RecordError, GENERIC_FETCH_ERROR};
pub use models::{FetchState, MovieSummary, SearchCount};
pub use services::{MovieApi, PopularityRecorder, PopularityStore, TmdbClient};
