use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One movie record as returned by the movie API.
///
/// Only `id` is required. The display fields are optional and everything
/// else is kept in `extra` so the record round-trips unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MovieSummary {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            poster_path: None,
            vote_average: None,
            release_date: None,
            original_language: None,
            extra: Map::new(),
        }
    }

    pub fn with_poster(mut self, poster_path: impl Into<String>) -> Self {
        self.poster_path = Some(poster_path.into());
        self
    }
}

/// Success body of the discover and search endpoints.
///
/// `success` and `status_message` form the API's error envelope; a body
/// carrying `success: false` is an upstream failure even on HTTP 200.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePage {
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status_message: Option<String>,
}
