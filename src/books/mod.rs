//! Book-search subsystem: the paginated, stateful query workflow.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │  BooksAgent   │────▶│ PaginationEngine │────▶│ SearchProvider  │
//! │ (messages +   │     │ (index/cache     │     │ (Google Books)  │
//! │  persistence) │     │  decisions)      │     └─────────────────┘
//! └───────┬───────┘     └──────────────────┘
//!         │
//!         ▼
//! ┌───────────────┐
//! │  ResultStore  │
//! │ (per-user     │
//! │  session)     │
//! └───────────────┘
//! ```
//!
//! The engine holds no state of its own; the agent loads the session,
//! runs the engine, persists only what changed (whole session on a fresh
//! search, window and/or cache tail on a page turn), and renders the
//! reply. A provider or store failure surfaces before anything is
//! written, so stored state never ends up half-updated.
//!
//! Turns for the same user must be serialized by the caller; see the
//! [`store`] module notes.

pub mod engine;
pub mod format;
pub mod provider;
pub mod store;
pub mod types;

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::agents::AgentResponse;
use engine::{MoreOutcome, PaginationEngine, PreviousOutcome, SearchOutcome};
use format::page_to_display;
use provider::{ProviderError, SearchProvider};
use store::ResultStore;
use types::BookQuery;

pub use types::{Book, ResultWindow, SearchSession, DISPLAY_PAGE_SIZE};

/// Book-search intents the agent understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooksIntent {
    Search,
    More,
    Previous,
}

impl FromStr for BooksIntent {
    type Err = UnknownIntent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(Self::Search),
            "more" => Ok(Self::More),
            "previous" => Ok(Self::Previous),
            other => Err(UnknownIntent(other.to_string())),
        }
    }
}

/// Intent name the books agent does not handle.
#[derive(Debug, Error)]
#[error("unknown books intent: {0}")]
pub struct UnknownIntent(pub String);

/// Errors from handling a books intent.
#[derive(Debug, Error)]
pub enum BooksError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] crate::storage::StoreError),

    #[error("display serialization error: {0}")]
    Display(#[from] serde_json::Error),
}

/// The books agent: message rendering and persistence around the
/// pagination engine.
pub struct BooksAgent {
    engine: PaginationEngine,
    store: Arc<dyn ResultStore>,
}

impl BooksAgent {
    pub fn new(provider: Arc<dyn SearchProvider>, store: Arc<dyn ResultStore>) -> Self {
        Self {
            engine: PaginationEngine::new(provider, DISPLAY_PAGE_SIZE),
            store,
        }
    }

    pub fn with_page_size(
        provider: Arc<dyn SearchProvider>,
        store: Arc<dyn ResultStore>,
        page_size: usize,
    ) -> Self {
        Self {
            engine: PaginationEngine::new(provider, page_size),
            store,
        }
    }

    pub async fn handle(
        &self,
        intent: BooksIntent,
        user_id: &str,
        query_text: &str,
        parameters: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<AgentResponse, BooksError> {
        match intent {
            BooksIntent::Search => self.search(user_id, query_text, parameters).await,
            BooksIntent::More => self.more(user_id).await,
            BooksIntent::Previous => self.previous(user_id).await,
        }
    }

    async fn search(
        &self,
        user_id: &str,
        query_text: &str,
        parameters: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<AgentResponse, BooksError> {
        let query = BookQuery::from_parameters(query_text, parameters);
        tracing::debug!("Book search for user {}: {}", user_id, query.search_string());

        match self.engine.search(query).await? {
            SearchOutcome::NoResults => {
                // Prior state is cleared even on an empty search.
                self.store.clear(user_id).await?;
                Ok(AgentResponse::say(
                    "I couldn't find any results. Can you try again?",
                ))
            }
            SearchOutcome::Results { session, page } => {
                self.store.replace(user_id, &session).await?;
                Ok(AgentResponse::say("Here's what I found.")
                    .with_display(page_to_display(&page)?))
            }
        }
    }

    async fn more(&self, user_id: &str) -> Result<AgentResponse, BooksError> {
        let Some(session) = self.store.load(user_id).await? else {
            return Ok(no_search_yet());
        };

        match self.engine.more(session).await? {
            MoreOutcome::Exhausted { .. } => {
                Ok(AgentResponse::say("I'm sorry, there are no more results."))
            }
            MoreOutcome::Advanced {
                session,
                page,
                appended_at,
            } => {
                if let Some(position) = appended_at {
                    self.store
                        .append_items(user_id, position, &session.cached[position..])
                        .await?;
                }
                self.store.put_window(user_id, &session.window).await?;
                Ok(AgentResponse::say("Here's the next page of results")
                    .with_display(page_to_display(&page)?))
            }
        }
    }

    async fn previous(&self, user_id: &str) -> Result<AgentResponse, BooksError> {
        let Some(session) = self.store.load(user_id).await? else {
            return Ok(no_search_yet());
        };

        match self.engine.previous(session) {
            PreviousOutcome::FirstPage { page, .. } => {
                // The stored index is already 0; nothing to rewrite.
                Ok(AgentResponse::say("This is the first page of results.")
                    .with_display(page_to_display(&page)?))
            }
            PreviousOutcome::Moved { session, page } => {
                self.store.put_window(user_id, &session.window).await?;
                Ok(AgentResponse::say("Here's the previous page of results")
                    .with_display(page_to_display(&page)?))
            }
        }
    }
}

/// Policy for `more`/`previous` before any search: a gentle nudge, no
/// state change.
fn no_search_yet() -> AgentResponse {
    AgentResponse::say("You haven't searched for any books yet. Try asking me to find some.")
}
