use std::fmt;

use crate::models::{FetchState, MovieSummary, SearchCount};
use crate::utils::{poster_url, rating, release_year};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderInstruction {
    Nothing,
    Spinner,
    Error(String),
    Movies(Vec<MovieCard>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieCard {
    pub key: u64,
    pub title: String,
    pub rating: String,
    pub year: String,
    pub language: String,
    pub poster_url: String,
}

impl MovieCard {
    pub fn from_movie(movie: &MovieSummary) -> Self {
        Self {
            key: movie.id,
            title: movie
                .title
                .clone()
                .unwrap_or_else(|| "Untitled".to_string()),
            rating: rating(movie.vote_average),
            year: release_year(movie.release_date.as_deref()),
            language: movie
                .original_language
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            poster_url: poster_url(movie.poster_path.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendingEntry {
    pub rank: usize,
    pub search_term: String,
    pub count: u64,
    pub poster_url: String,
}

pub fn project(state: &FetchState) -> RenderInstruction {
    match state {
        FetchState::Idle => RenderInstruction::Nothing,
        FetchState::Loading => RenderInstruction::Spinner,
        FetchState::Failure(message) => RenderInstruction::Error(message.clone()),
        FetchState::Success(movies) => {
            RenderInstruction::Movies(movies.iter().map(MovieCard::from_movie).collect())
        }
    }
}

pub fn project_trending(entries: &[SearchCount]) -> Vec<TrendingEntry> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| TrendingEntry {
            rank: index + 1,
            search_term: entry.search_term.clone(),
            count: entry.count,
            poster_url: entry.poster_url.clone(),
        })
        .collect()
}

impl fmt::Display for MovieCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | ★ {} | {} | {}",
            self.title, self.rating, self.language, self.year
        )
    }
}

impl fmt::Display for RenderInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderInstruction::Nothing => Ok(()),
            RenderInstruction::Spinner => writeln!(f, "Loading..."),
            RenderInstruction::Error(message) => writeln!(f, "{}", message),
            RenderInstruction::Movies(cards) if cards.is_empty() => {
                writeln!(f, "No movies found.")
            }
            RenderInstruction::Movies(cards) => {
                for card in cards {
                    writeln!(f, "  {}", card)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TrendingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {} ({})", self.rank, self.search_term, self.count)
    }
}
