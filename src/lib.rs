//! # concierge
//!
//! Backend core of a conversational-agent web application.
//!
//! The transport layer and the natural-language-understanding service are
//! external: they hand this crate a detected intent plus parameters, and
//! get back the finished turn (reply text, optional display payload,
//! optional redirect hint).
//!
//! ## Architecture
//!
//! ```text
//!        ┌──────────────────────────────────┐
//!        │            Dispatcher            │
//!        │  (closed enum over agent kinds)  │
//!        └───────┬──────────────────┬───────┘
//!                │                  │
//!                ▼                  ▼
//!        ┌──────────────┐   ┌──────────────┐
//!        │  BooksAgent  │   │  one-shot    │
//!        │ (paginated,  │   │  handlers    │
//!        │  stateful)   │   │ (tip, time,  │
//!        └──────┬───────┘   │  web, ...)   │
//!               │           └──────────────┘
//!        ┌──────┴───────┐
//!        ▼              ▼
//!  ┌───────────┐ ┌─────────────┐
//!  │ Result    │ │ Search      │
//!  │ Store     │ │ Provider    │
//!  └───────────┘ └─────────────┘
//! ```
//!
//! ## Turn Flow
//! 1. Receive the detected intent via [`dispatch::IntentRequest`]
//! 2. Route to the matching agent handler
//! 3. Persist whatever state the turn changed (search session, history)
//! 4. Return the [`dispatch::TurnOutput`] for the display layer
//!
//! ## Modules
//! - `dispatch`: intent routing and turn assembly
//! - `books`: the paginated book-search subsystem
//! - `agents`: one-shot handlers (tip, time/date, name, web, recall)
//! - `history`: per-user conversation log

pub mod agents;
pub mod books;
pub mod config;
pub mod dispatch;
pub mod history;
pub mod storage;

pub use config::Config;
pub use dispatch::{Dispatcher, IntentRequest, TurnOutput};

use std::sync::Arc;

use books::provider::GoogleBooksProvider;
use books::BooksAgent;

/// Initialize logging from `RUST_LOG`, defaulting to debug output for
/// this crate. Call once from the host binary.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "concierge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Assemble a [`Dispatcher`] from configuration: provider client, result
/// store, conversation store.
pub async fn build_dispatcher(config: &Config) -> anyhow::Result<Dispatcher> {
    let mut provider = GoogleBooksProvider::new(config.books_api_key.clone());
    if let Some(url) = &config.books_api_url {
        provider = provider.with_base_url(url.clone());
    }
    let provider = Arc::new(provider.with_batch_size(config.page_size));

    let result_store =
        books::store::create_result_store(config.store, config.data_dir.clone()).await?;
    let history =
        history::create_conversation_store(config.store, config.data_dir.clone()).await?;

    let books = BooksAgent::with_page_size(provider, result_store, config.page_size);
    tracing::info!(
        "Dispatcher ready (store: {:?}, page size: {})",
        config.store,
        config.page_size
    );
    Ok(Dispatcher::new(books, history))
}
