use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;

use crate::error::RecordResult;
use crate::models::SearchCount;

/// Search counts in a sorted set, per-term details in a hash.
#[derive(Clone)]
pub struct RedisRepo {
    manager: ConnectionManager,
    prefix: String,
}

impl RedisRepo {
    pub async fn new(redis_url: &str, prefix: &str) -> RecordResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self {
            manager,
            prefix: prefix.to_string(),
        })
    }

    pub async fn increment(&self, search_term: &str, movie_id: u64, poster_url: &str) -> RecordResult<u64> {
        let mut conn = self.manager.clone();
        let details = details_key(&self.prefix, search_term);

        let count: f64 = conn
            .zincr(counts_key(&self.prefix), search_term, 1)
            .await?;
        conn.hset_nx::<_, _, _, ()>(&details, "movie_id", movie_id).await?;
        conn.hset_nx::<_, _, _, ()>(&details, "poster_url", poster_url).await?;
        conn.hset::<_, _, _, ()>(&details, "updated_at", Utc::now().timestamp())
            .await?;

        Ok(count as u64)
    }

    pub async fn top(&self, limit: usize) -> RecordResult<Vec<SearchCount>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.manager.clone();
        let ranked: Vec<(String, f64)> = conn
            .zrevrange_withscores(counts_key(&self.prefix), 0, last_rank(limit))
            .await?;

        let mut records = Vec::with_capacity(ranked.len());
        for (search_term, score) in ranked {
            let fields: HashMap<String, String> = conn
                .hgetall(details_key(&self.prefix, &search_term))
                .await?;
            records.push(search_count_from_fields(search_term, score, &fields));
        }
        Ok(records)
    }
}

/// Inclusive stop index for the first `limit` ranks. `limit` must be non-zero.
fn last_rank(limit: usize) -> isize {
    isize::try_from(limit).unwrap_or(isize::MAX) - 1
}

fn counts_key(prefix: &str) -> String {
    format!("{}:search_counts", prefix)
}

fn details_key(prefix: &str, search_term: &str) -> String {
    format!("{}:search:{}", prefix, search_term)
}

fn search_count_from_fields(
    search_term: String,
    score: f64,
    fields: &HashMap<String, String>,
) -> SearchCount {
    let updated_at = fields
        .get("updated_at")
        .and_then(|ts| ts.parse::<i64>().ok())
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .unwrap_or_default();

    SearchCount {
        search_term,
        count: score as u64,
        movie_id: fields
            .get("movie_id")
            .and_then(|id| id.parse().ok())
            .unwrap_or_default(),
        poster_url: fields.get("poster_url").cloned().unwrap_or_default(),
        updated_at,
    }
}
