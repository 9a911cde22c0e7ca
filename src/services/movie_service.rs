use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::config::TmdbConfig;
use crate::error::FetchError;
use crate::models::{MoviePage, MovieSummary};

/// Which listing a query maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Popularity-sorted listing, used when there is no search text.
    Discover,
    Search(String),
}

impl Endpoint {
    pub fn for_query(query: &str) -> Self {
        if query.is_empty() {
            Endpoint::Discover
        } else {
            Endpoint::Search(query.to_string())
        }
    }

    pub fn url(&self, base_url: &str) -> Result<Url, FetchError> {
        let base_url = base_url.trim_end_matches('/');
        let parsed = match self {
            Endpoint::Discover => Url::parse_with_params(
                &format!("{}/discover/movie", base_url),
                &[("sort_by", "popularity.desc")],
            ),
            Endpoint::Search(query) => Url::parse_with_params(
                &format!("{}/search/movie", base_url),
                &[("query", query.as_str())],
            ),
        };
        parsed.map_err(|e| FetchError::InvalidUrl(e.to_string()))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieApi: Send + Sync {
    async fn fetch_movies(&self, endpoint: &Endpoint) -> Result<Vec<MovieSummary>, FetchError>;
}

/// Interprets a finished movie API exchange.
///
/// A missing `results` list is an empty page, not an error.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<Vec<MovieSummary>, FetchError> {
    if !status.is_success() {
        debug!("Movie API error body: {}", body);
        return Err(FetchError::Http {
            status: status.as_u16(),
        });
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;
    if !value.is_object() {
        return Err(FetchError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    }

    let page: MoviePage = serde_json::from_value(value)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    if page.success == Some(false) {
        return Err(FetchError::Upstream {
            message: page
                .status_message
                .unwrap_or_else(|| "unknown upstream failure".to_string()),
        });
    }

    Ok(page.results)
}

#[derive(Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    settings: TmdbConfig,
}

impl TmdbClient {
    pub fn new(settings: TmdbConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;
        Ok(Self { http, settings })
    }
}

#[async_trait]
impl MovieApi for TmdbClient {
    async fn fetch_movies(&self, endpoint: &Endpoint) -> Result<Vec<MovieSummary>, FetchError> {
        let url = endpoint.url(&self.settings.base_url)?;
        debug!("GET {}", url.path());

        let mut request = self.http.get(url).header(ACCEPT, "application/json");
        if !self.settings.api_key.is_empty() {
            request = request.bearer_auth(&self.settings.api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const BASE: &str = "https://api.themoviedb.org/3";

    #[rstest]
    #[case("", "https://api.themoviedb.org/3/discover/movie?sort_by=popularity.desc")]
    #[case("batman", "https://api.themoviedb.org/3/search/movie?query=batman")]
    #[case("the dark knight", "https://api.themoviedb.org/3/search/movie?query=the+dark+knight")]
    #[case("batman & robin", "https://api.themoviedb.org/3/search/movie?query=batman+%26+robin")]
    #[case(" ", "https://api.themoviedb.org/3/search/movie?query=+")]
    fn selects_endpoint_by_query(#[case] query: &str, #[case] expected: &str) {
        let url = Endpoint::for_query(query).url(BASE).unwrap();
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn empty_query_is_discover() {
        assert_eq!(Endpoint::for_query(""), Endpoint::Discover);
        assert_eq!(
            Endpoint::for_query("heat"),
            Endpoint::Search("heat".to_string())
        );
    }

    #[test]
    fn trailing_slash_in_base_is_ignored() {
        let url = Endpoint::Discover.url("http://localhost:9000/3/").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/3/discover/movie?sort_by=popularity.desc"
        );
    }

    #[test]
    fn invalid_base_is_reported() {
        let err = Endpoint::Discover.url("not a url").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED)]
    #[case(StatusCode::NOT_FOUND)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR)]
    fn non_success_status_is_http_error(#[case] status: StatusCode) {
        let body = json!({
            "success": false,
            "status_code": 7,
            "status_message": "Invalid API key: You must be granted a valid key."
        })
        .to_string();
        let err = interpret_response(status, &body).unwrap_err();
        assert!(matches!(err, FetchError::Http { status: s } if s == status.as_u16()));
    }

    #[test]
    fn empty_results_are_success() {
        let body = json!({ "page": 1, "results": [], "total_results": 0 }).to_string();
        let movies = interpret_response(StatusCode::OK, &body).unwrap();
        assert!(movies.is_empty());
    }

    #[test]
    fn missing_results_default_to_empty() {
        let movies = interpret_response(StatusCode::OK, "{}").unwrap();
        assert!(movies.is_empty());
    }

    #[test]
    fn results_keep_api_order() {
        let body = json!({
            "results": [
                { "id": 272, "title": "Batman Begins" },
                { "id": 155, "title": "The Dark Knight" }
            ]
        })
        .to_string();
        let movies = interpret_response(StatusCode::OK, &body).unwrap();
        let ids: Vec<u64> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![272, 155]);
    }

    #[test]
    fn success_false_is_upstream_error() {
        let body = json!({ "success": false, "status_message": "Service offline." }).to_string();
        let err = interpret_response(StatusCode::OK, &body).unwrap_err();
        assert!(matches!(err, FetchError::Upstream { ref message } if message == "Service offline."));
    }

    async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/3", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).to_lowercase()
        });

        (base_url, server)
    }

    fn client(base_url: String, api_key: &str) -> TmdbClient {
        TmdbClient::new(TmdbConfig {
            base_url,
            api_key: api_key.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn client_sends_encoded_search_with_auth_headers() {
        let body = json!({ "results": [{ "id": 414906, "title": "The Batman" }] }).to_string();
        let (base_url, server) = serve_once("200 OK", body).await;

        let movies = client(base_url, "tok")
            .fetch_movies(&Endpoint::Search("batman & robin".to_string()))
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("get /3/search/movie?query=batman+%26+robin http/1.1\r\n"));
        assert!(request.contains("\r\naccept: application/json\r\n"));
        assert!(request.contains("\r\nauthorization: bearer tok\r\n"));
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, 414906);
    }

    #[tokio::test]
    async fn client_without_key_gets_an_http_error() {
        let body = json!({ "success": false, "status_message": "Invalid API key" }).to_string();
        let (base_url, server) = serve_once("401 Unauthorized", body).await;

        let err = client(base_url, "")
            .fetch_movies(&Endpoint::Discover)
            .await
            .unwrap_err();
        let request = server.await.unwrap();

        assert!(request.starts_with("get /3/discover/movie?sort_by=popularity.desc http/1.1\r\n"));
        assert!(!request.contains("authorization:"));
        assert!(matches!(err, FetchError::Http { status: 401 }));
    }

    #[rstest]
    #[case("not json")]
    #[case("[1, 2, 3]")]
    #[case(r#"{"results": [{"title": "no id"}]}"#)]
    fn unusable_bodies_are_malformed(#[case] body: &str) {
        let err = interpret_response(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }
}
