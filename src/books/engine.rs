//! Pagination engine for the book-search workflow.
//!
//! The engine is stateless between invocations: each call receives the
//! current [`SearchSession`] and returns the updated session inside a
//! data-level outcome. Mapping outcomes to user-visible messages and
//! persisting the session are the agent layer's job, which keeps this core
//! unit-testable without a real store.
//!
//! Already-seen pages are never re-fetched; the cache is append-only per
//! query and is replaced entirely on a new search.

use std::sync::Arc;

use super::provider::{ProviderError, SearchProvider};
use super::types::{Book, BookQuery, ResultWindow, SearchSession};

/// Outcome of a fresh search.
#[derive(Debug)]
pub enum SearchOutcome {
    /// The provider returned nothing; any prior session should be cleared.
    NoResults,
    /// A new session replacing whatever came before, plus the first page.
    Results {
        session: SearchSession,
        page: Vec<Book>,
    },
}

/// Outcome of a "more" request.
#[derive(Debug)]
pub enum MoreOutcome {
    /// No further page exists. The session is returned unchanged and must
    /// not be rewritten.
    Exhausted { session: SearchSession },
    /// The window advanced. `appended_at` is the cache offset where newly
    /// fetched items begin, or `None` if the page was served from cache.
    Advanced {
        session: SearchSession,
        page: Vec<Book>,
        appended_at: Option<usize>,
    },
}

/// Outcome of a "previous" request. Never fetches: earlier pages are
/// always already cached.
#[derive(Debug)]
pub enum PreviousOutcome {
    /// Already at the first page; the index is clamped to 0.
    FirstPage {
        session: SearchSession,
        page: Vec<Book>,
    },
    /// Stepped back one page.
    Moved {
        session: SearchSession,
        page: Vec<Book>,
    },
}

/// Decides, for each request, what to fetch, what to reuse from cache, and
/// what slice to present.
pub struct PaginationEngine {
    provider: Arc<dyn SearchProvider>,
    page_size: usize,
}

impl PaginationEngine {
    pub fn new(provider: Arc<dyn SearchProvider>, page_size: usize) -> Self {
        Self {
            provider,
            page_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Run a fresh search starting at offset 0.
    pub async fn search(&self, query: BookQuery) -> Result<SearchOutcome, ProviderError> {
        let fetched = self.provider.fetch(&query, 0).await?;
        if fetched.items.is_empty() {
            return Ok(SearchOutcome::NoResults);
        }

        let window = ResultWindow {
            start_index: 0,
            total_results: fetched.total_matches,
            cached_count: fetched.items.len(),
        };
        let session = SearchSession {
            query,
            window,
            cached: fetched.items,
        };
        let page = self.page_slice(&session);
        Ok(SearchOutcome::Results { session, page })
    }

    /// Advance to the next page, fetching only when the page is not yet
    /// cached.
    ///
    /// State mutation happens only after a successful fetch: on a provider
    /// error the session passed in is simply dropped and the stored copy
    /// stays valid.
    pub async fn more(&self, mut session: SearchSession) -> Result<MoreOutcome, ProviderError> {
        debug_assert_eq!(session.window.cached_count, session.cached.len());

        let next = session.window.start_index + self.page_size;
        if next >= session.window.total_results {
            return Ok(MoreOutcome::Exhausted { session });
        }

        // Next full page already cached: advance the window only.
        if next + self.page_size <= session.window.cached_count {
            session.window.start_index = next;
            let page = self.page_slice(&session);
            return Ok(MoreOutcome::Advanced {
                session,
                page,
                appended_at: None,
            });
        }

        let fetched = self.provider.fetch(&session.query, next).await?;
        if fetched.items.is_empty() {
            // The reported total overstated what is actually retrievable;
            // treat as exhaustion, not an error.
            return Ok(MoreOutcome::Exhausted { session });
        }

        let appended_at = session.cached.len();
        session.cached.extend(fetched.items);
        session.window.start_index = next;
        session.window.cached_count = session.cached.len();
        let page = self.page_slice(&session);
        Ok(MoreOutcome::Advanced {
            session,
            page,
            appended_at: Some(appended_at),
        })
    }

    /// Step back one page, clamping at the first page.
    pub fn previous(&self, mut session: SearchSession) -> PreviousOutcome {
        match session.window.start_index.checked_sub(self.page_size) {
            Some(candidate) => {
                session.window.start_index = candidate;
                let page = self.page_slice(&session);
                PreviousOutcome::Moved { session, page }
            }
            None => {
                session.window.start_index = 0;
                let page = self.page_slice(&session);
                PreviousOutcome::FirstPage { session, page }
            }
        }
    }

    /// The display slice `[start_index, start_index + page_size)` clipped
    /// to what is cached.
    fn page_slice(&self, session: &SearchSession) -> Vec<Book> {
        let start = session.window.start_index.min(session.cached.len());
        let end = (start + self.page_size).min(session.cached.len());
        session.cached[start..end].to_vec()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::books::provider::{ProviderError, ProviderPage, SearchProvider};
    use crate::books::types::{Book, BookQuery};

    /// Canned provider serving a fixed catalog in fixed-size batches,
    /// recording every fetch offset.
    pub struct FakeProvider {
        catalog: Vec<Book>,
        reported_total: usize,
        batch_size: usize,
        pub fetches: Mutex<Vec<usize>>,
        /// Fetch offsets at or above this value fail with a server error.
        pub fail_from: Option<usize>,
    }

    impl FakeProvider {
        pub fn with_titles(count: usize) -> Self {
            let catalog = (0..count).map(|i| Book::titled(format!("Book {}", i))).collect();
            Self {
                catalog,
                reported_total: count,
                batch_size: 5,
                fetches: Mutex::new(Vec::new()),
                fail_from: None,
            }
        }

        pub fn reporting_total(mut self, total: usize) -> Self {
            self.reported_total = total;
            self
        }

        pub fn failing_from(mut self, index: usize) -> Self {
            self.fail_from = Some(index);
            self
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.lock().unwrap().len()
        }

        pub fn shared(self) -> Arc<Self> {
            Arc::new(self)
        }
    }

    #[async_trait]
    impl SearchProvider for FakeProvider {
        async fn fetch(
            &self,
            _query: &BookQuery,
            start_index: usize,
        ) -> Result<ProviderPage, ProviderError> {
            if let Some(fail_from) = self.fail_from {
                if start_index >= fail_from {
                    return Err(ProviderError::server_error(503, "unavailable".to_string()));
                }
            }
            self.fetches.lock().unwrap().push(start_index);
            let start = start_index.min(self.catalog.len());
            let end = (start + self.batch_size).min(self.catalog.len());
            Ok(ProviderPage {
                items: self.catalog[start..end].to_vec(),
                total_matches: self.reported_total,
            })
        }
    }
}
