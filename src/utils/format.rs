const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const POSTER_PLACEHOLDER: &str = "/No-Poster.png";
const NOT_AVAILABLE: &str = "N/A";

pub fn poster_url(poster_path: Option<&str>) -> String {
    match poster_path.map(str::trim).filter(|path| !path.is_empty()) {
        Some(path) if path.starts_with('/') => format!("{}{}", POSTER_BASE_URL, path),
        Some(path) => format!("{}/{}", POSTER_BASE_URL, path),
        None => POSTER_PLACEHOLDER.to_string(),
    }
}

/// Year part of an ISO `YYYY-MM-DD` date.
pub fn release_year(release_date: Option<&str>) -> String {
    release_date
        .and_then(|date| date.split('-').next())
        .filter(|year| !year.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn rating(vote_average: Option<f64>) -> String {
    match vote_average {
        Some(value) if value > 0.0 => format!("{:.1}", value),
        _ => NOT_AVAILABLE.to_string(),
    }
}
