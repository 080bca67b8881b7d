//! Types for the book-search subsystem.

use serde::{Deserialize, Serialize};

/// Number of results shown per conversational turn.
pub const DISPLAY_PAGE_SIZE: usize = 5;

/// A normalized book-search request.
///
/// Built once from the detected intent parameters and immutable for the
/// lifetime of the session; a new `search` intent replaces it wholesale
/// along with the cached results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookQuery {
    /// Raw user utterance the query was built from.
    pub raw_text: String,
    /// Title filter, mapped to the provider's `intitle:` operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Author filters, mapped to `inauthor:`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    /// Subject filter, mapped to `subject:`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Two-letter language restriction, passed through as a separate
    /// provider parameter rather than a query operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl BookQuery {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            title: None,
            authors: Vec::new(),
            category: None,
            language: None,
        }
    }

    /// Build a query from the detected intent parameters.
    ///
    /// Recognized parameters: `title`, `author` (string or list of
    /// strings), `category`, `language`. Anything else is ignored.
    pub fn from_parameters(
        raw_text: &str,
        parameters: &serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let mut query = Self::new(raw_text);

        query.title = string_param(parameters, "title");
        query.category = string_param(parameters, "category");
        query.language = string_param(parameters, "language");

        match parameters.get("author") {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                query.authors.push(s.trim().to_string());
            }
            Some(serde_json::Value::Array(values)) => {
                query.authors.extend(
                    values
                        .iter()
                        .filter_map(|v| v.as_str())
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty()),
                );
            }
            _ => {}
        }

        query
    }

    /// The search string sent to the provider, with field filters appended
    /// as query operators.
    pub fn search_string(&self) -> String {
        let mut out = self.raw_text.trim().to_string();
        if let Some(title) = &self.title {
            out.push_str(&format!(" intitle:\"{}\"", title));
        }
        for author in &self.authors {
            out.push_str(&format!(" inauthor:\"{}\"", author));
        }
        if let Some(category) = &self.category {
            out.push_str(&format!(" subject:\"{}\"", category));
        }
        out.trim().to_string()
    }
}

fn string_param(
    parameters: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<String> {
    parameters
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// A single book result.
///
/// Serialized field names match what the display layer expects
/// (camelCase JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_link: Option<String>,
}

impl Book {
    /// Minimal book with only a title (useful in tests).
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: Vec::new(),
            published_date: None,
            description: None,
            average_rating: None,
            thumbnail_link: None,
            info_link: None,
        }
    }
}

/// Pagination window over the cached results.
///
/// # Invariants
/// - `start_index <= total_results`
/// - `cached_count >= start_index` whenever cached items exist
/// - `total_results` is authoritative from the first fetch of the current
///   query and never decreases except on a fresh search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultWindow {
    /// Index of the first item shown this turn.
    pub start_index: usize,
    /// Total matches the provider reported for the query. Can overstate
    /// what is actually retrievable.
    pub total_results: usize,
    /// How many items are cached locally, counted from index 0.
    pub cached_count: usize,
}

/// The per-user search state: one query, one window, one append-only cache.
///
/// Created together on `search`, mutated by `more`/`previous`, discarded
/// wholesale by the next `search`. Each user owns exactly one of these at a
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSession {
    pub query: BookQuery,
    pub window: ResultWindow,
    pub cached: Vec<Book>,
}
