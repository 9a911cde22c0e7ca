use super::MovieSummary;

/// Lifecycle of the most recent movie query.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success(Vec<MovieSummary>),
    Failure(String),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchState::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn movies(&self) -> &[MovieSummary] {
        match self {
            FetchState::Success(movies) => movies,
            _ => &[],
        }
    }
}
