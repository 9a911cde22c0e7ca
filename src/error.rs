use thiserror::Error;

/// Message shown to the user for every failed movie fetch.
pub const GENERIC_FETCH_ERROR: &str = "Error fetching movies. Please try again later.";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Movie API returned HTTP {status}")]
    Http { status: u16 },

    #[error("Movie API reported a failure: {message}")]
    Upstream { message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        GENERIC_FETCH_ERROR
    }
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;
