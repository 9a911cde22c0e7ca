use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::PathBuf;

use crate::error::RecordResult;
use crate::models::SearchCount;

#[derive(Clone)]
pub struct SearchCountRepo {
    path: PathBuf,
}

impl SearchCountRepo {
    pub fn new(path: impl Into<PathBuf>) -> RecordResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let repo = Self { path };
        repo.init()?;
        Ok(repo)
    }

    fn init(&self) -> RecordResult<()> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS search_counts (
                search_term TEXT PRIMARY KEY,
                count INTEGER NOT NULL DEFAULT 1,
                movie_id INTEGER NOT NULL,
                poster_url TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_search_counts_count ON search_counts(count);",
        )?;
        Ok(())
    }

    /// Bumps the count for `search_term`, creating the row on first use.
    /// The movie and poster of the first recording are kept.
    pub fn increment(&self, search_term: &str, movie_id: u64, poster_url: &str) -> RecordResult<u64> {
        let conn = Connection::open(&self.path)?;
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO search_counts (search_term, count, movie_id, poster_url, updated_at)
             VALUES (?1, 1, ?2, ?3, ?4)
             ON CONFLICT(search_term) DO UPDATE SET
                count = count + 1,
                updated_at = excluded.updated_at",
            params![search_term, movie_id as i64, poster_url, now],
        )?;

        let count: i64 = conn.query_row(
            "SELECT count FROM search_counts WHERE search_term = ?1",
            params![search_term],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    pub fn get(&self, search_term: &str) -> RecordResult<Option<SearchCount>> {
        let conn = Connection::open(&self.path)?;
        let record = conn
            .query_row(
                "SELECT search_term, count, movie_id, poster_url, updated_at
                 FROM search_counts
                 WHERE search_term = ?1",
                params![search_term],
                row_to_search_count,
            )
            .optional()?;
        Ok(record)
    }

    pub fn top(&self, limit: usize) -> RecordResult<Vec<SearchCount>> {
        let conn = Connection::open(&self.path)?;
        let mut stmt = conn.prepare(
            "SELECT search_term, count, movie_id, poster_url, updated_at
             FROM search_counts
             ORDER BY count DESC, updated_at DESC
             LIMIT ?1",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit], row_to_search_count)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

fn row_to_search_count(row: &rusqlite::Row<'_>) -> rusqlite::Result<SearchCount> {
    let updated_at_ts: i64 = row.get(4)?;
    Ok(SearchCount {
        search_term: row.get(0)?,
        count: row.get::<_, i64>(1)? as u64,
        movie_id: row.get::<_, i64>(2)? as u64,
        poster_url: row.get(3)?,
        updated_at: DateTime::<Utc>::from_timestamp(updated_at_ts, 0).unwrap_or_default(),
    })
}
