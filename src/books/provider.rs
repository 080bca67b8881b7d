//! Remote search provider adapter (Google Books volumes API).
//!
//! Errors are classified as transient or permanent so callers can decide
//! whether a retry makes sense; the pagination engine itself never retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::types::{Book, BookQuery, DISPLAY_PAGE_SIZE};

const GOOGLE_BOOKS_API_URL: &str = "https://www.googleapis.com/books/v1";

/// One page of provider results.
///
/// `total_matches` is the provider's reported total for the whole query,
/// not the size of this page. It can overstate what is actually
/// retrievable: items without a title are dropped client-side, and the
/// catalog itself may drift between calls.
#[derive(Debug, Clone)]
pub struct ProviderPage {
    pub items: Vec<Book>,
    pub total_matches: usize,
}

/// Remote search provider contract.
///
/// `fetch` must be idempotent for the same `(query, start_index)` pair
/// within a session's lifetime.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn fetch(
        &self,
        query: &BookQuery,
        start_index: usize,
    ) -> Result<ProviderPage, ProviderError>;
}

/// Error from a provider call.
#[derive(Debug)]
pub struct ProviderError {
    /// The kind of error
    pub kind: ProviderErrorKind,
    /// HTTP status code, if applicable
    pub status_code: Option<u16>,
    /// Error message
    pub message: String,
}

impl ProviderError {
    pub fn server_error(status_code: u16, message: String) -> Self {
        Self {
            kind: ProviderErrorKind::ServerError,
            status_code: Some(status_code),
            message,
        }
    }

    pub fn client_error(status_code: u16, message: String) -> Self {
        Self {
            kind: ProviderErrorKind::ClientError,
            status_code: Some(status_code),
            message,
        }
    }

    pub fn network_error(message: String) -> Self {
        Self {
            kind: ProviderErrorKind::NetworkError,
            status_code: None,
            message,
        }
    }

    pub fn parse_error(message: String) -> Self {
        Self {
            kind: ProviderErrorKind::ParseError,
            status_code: None,
            message,
        }
    }

    /// Check if this error is transient and a retry by the caller could
    /// succeed.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (HTTP {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Classification of provider errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Rate limited (429) - transient
    RateLimited,
    /// Server error (500, 502, 503, 504) - transient
    ServerError,
    /// Client error (400, 401, 403, 404) - permanent
    ClientError,
    /// Network error (connection failed, timeout) - transient
    NetworkError,
    /// Response parsing error - permanent
    ParseError,
}

impl ProviderErrorKind {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ServerError | Self::NetworkError
        )
    }
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimited => write!(f, "Rate limited"),
            Self::ServerError => write!(f, "Server error"),
            Self::ClientError => write!(f, "Client error"),
            Self::NetworkError => write!(f, "Network error"),
            Self::ParseError => write!(f, "Parse error"),
        }
    }
}

/// Parse HTTP status code into error kind.
pub fn classify_http_status(status: u16) -> ProviderErrorKind {
    match status {
        429 => ProviderErrorKind::RateLimited,
        500 | 502 | 503 | 504 => ProviderErrorKind::ServerError,
        400..=499 => ProviderErrorKind::ClientError,
        _ => ProviderErrorKind::ServerError,
    }
}

/// Google Books volumes API client.
pub struct GoogleBooksProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    /// Items requested per fetch. Matches the display page size so the
    /// local cache grows in display-page steps.
    batch_size: usize,
}

impl GoogleBooksProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: GOOGLE_BOOKS_API_URL.to_string(),
            api_key,
            batch_size: DISPLAY_PAGE_SIZE,
        }
    }

    /// Override the API base URL (useful for pointing at a test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    fn create_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
        let status_code = status.as_u16();
        match classify_http_status(status_code) {
            ProviderErrorKind::ClientError => {
                ProviderError::client_error(status_code, body.to_string())
            }
            ProviderErrorKind::RateLimited => ProviderError {
                kind: ProviderErrorKind::RateLimited,
                status_code: Some(status_code),
                message: body.to_string(),
            },
            _ => ProviderError::server_error(status_code, body.to_string()),
        }
    }
}

#[async_trait]
impl SearchProvider for GoogleBooksProvider {
    async fn fetch(
        &self,
        query: &BookQuery,
        start_index: usize,
    ) -> Result<ProviderPage, ProviderError> {
        let url = format!("{}/volumes", self.base_url);
        let start = start_index.to_string();
        let max = self.batch_size.to_string();
        let q = query.search_string();

        let mut params: Vec<(&str, &str)> =
            vec![("q", q.as_str()), ("startIndex", &start), ("maxResults", &max)];
        if let Some(lang) = &query.language {
            params.push(("langRestrict", lang));
        }
        if let Some(key) = &self.api_key {
            params.push(("key", key));
        }

        let response = match self.client.get(&url).query(&params).send().await {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(ProviderError::network_error(format!(
                        "Request timeout: {}",
                        e
                    )));
                } else if e.is_connect() {
                    return Err(ProviderError::network_error(format!(
                        "Connection failed: {}",
                        e
                    )));
                } else {
                    return Err(ProviderError::network_error(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Self::create_error(status, &body));
        }

        let parsed: VolumesResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::parse_error(format!("Failed to parse response: {}, body: {}", e, body))
        })?;

        let items: Vec<Book> = parsed
            .items
            .into_iter()
            .filter_map(|v| v.into_book())
            .collect();

        tracing::debug!(
            "Fetched {} volumes at index {} (total reported: {})",
            items.len(),
            start_index,
            parsed.total_items
        );

        Ok(ProviderPage {
            items,
            total_matches: parsed.total_items,
        })
    }
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(rename = "totalItems", default)]
    total_items: usize,
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    published_date: Option<String>,
    description: Option<String>,
    average_rating: Option<f64>,
    image_links: Option<ImageLinks>,
    info_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

impl Volume {
    /// Volumes without a title are dropped; the UI cannot render them, so
    /// the reported total can exceed what we actually hand back.
    fn into_book(self) -> Option<Book> {
        let info = self.volume_info?;
        let title = info.title.filter(|t| !t.trim().is_empty())?;
        Some(Book {
            title,
            authors: info.authors,
            published_date: info.published_date,
            description: info.description,
            average_rating: info.average_rating,
            thumbnail_link: info.image_links.and_then(|l| l.thumbnail),
            info_link: info.info_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ProviderErrorKind::RateLimited.is_transient());
        assert!(ProviderErrorKind::ServerError.is_transient());
        assert!(ProviderErrorKind::NetworkError.is_transient());
        assert!(!ProviderErrorKind::ClientError.is_transient());
        assert!(!ProviderErrorKind::ParseError.is_transient());
    }

    #[test]
    fn http_status_classification() {
        assert_eq!(classify_http_status(429), ProviderErrorKind::RateLimited);
        assert_eq!(classify_http_status(500), ProviderErrorKind::ServerError);
        assert_eq!(classify_http_status(503), ProviderErrorKind::ServerError);
        assert_eq!(classify_http_status(400), ProviderErrorKind::ClientError);
        assert_eq!(classify_http_status(403), ProviderErrorKind::ClientError);
    }

    #[test]
    fn volume_response_drops_titleless_items() {
        let body = r#"{
            "totalItems": 3,
            "items": [
                {"volumeInfo": {"title": "The Dispossessed", "authors": ["Ursula K. Le Guin"]}},
                {"volumeInfo": {"authors": ["Anonymous"]}},
                {"volumeInfo": {"title": "  "}}
            ]
        }"#;
        let parsed: VolumesResponse = serde_json::from_str(body).unwrap();
        let books: Vec<Book> = parsed.items.into_iter().filter_map(|v| v.into_book()).collect();
        assert_eq!(parsed.total_items, 3);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "The Dispossessed");
        assert_eq!(books[0].authors, vec!["Ursula K. Le Guin".to_string()]);
    }

    #[test]
    fn volume_response_tolerates_missing_fields() {
        let parsed: VolumesResponse = serde_json::from_str(r#"{"totalItems": 0}"#).unwrap();
        assert!(parsed.items.is_empty());
    }
}
