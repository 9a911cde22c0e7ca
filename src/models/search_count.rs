use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted popularity row for one search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCount {
    pub search_term: String,
    pub count: u64,
    pub movie_id: u64,
    pub poster_url: String,
    pub updated_at: DateTime<Utc>,
}
