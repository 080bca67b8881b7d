//! Per-user result storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database
//!
//! The store keeps three keyed collections per user, matching the
//! lifecycle of a search session: the query (single value), the cached
//! items (ordered by position), and the result window (single value).
//! `replace` and `clear` operate on all three at once (fresh search);
//! `put_window` rewrites the indices only (more/previous); `append_items`
//! extends the cache without touching the rest.
//!
//! Turns for one user perform non-atomic read-modify-write sequences
//! against this store. Serializing concurrent turns for the same user is
//! the caller's responsibility; no locking is provided across calls.

mod memory;
mod sqlite;

pub use memory::InMemoryResultStore;
pub use sqlite::SqliteResultStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::books::types::{Book, ResultWindow, SearchSession};
use crate::storage::{StoreError, StoreKind};

/// Result store trait - implemented by all storage backends.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Load the user's current search session, if any.
    async fn load(&self, user_id: &str) -> Result<Option<SearchSession>, StoreError>;

    /// Replace the user's entire session (query, window, cached items).
    async fn replace(&self, user_id: &str, session: &SearchSession) -> Result<(), StoreError>;

    /// Rewrite the window only, leaving query and cache untouched.
    ///
    /// Fails with [`StoreError::SessionMissing`] if the user has no stored
    /// session.
    async fn put_window(&self, user_id: &str, window: &ResultWindow) -> Result<(), StoreError>;

    /// Append items to the cache starting at `position`.
    async fn append_items(
        &self,
        user_id: &str,
        position: usize,
        items: &[Book],
    ) -> Result<(), StoreError>;

    /// Delete everything stored for the user.
    async fn clear(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Create a result store based on type and configuration.
pub async fn create_result_store(
    kind: StoreKind,
    base_dir: PathBuf,
) -> Result<Arc<dyn ResultStore>, StoreError> {
    match kind {
        StoreKind::Memory => Ok(Arc::new(InMemoryResultStore::new())),
        StoreKind::Sqlite => {
            let store = SqliteResultStore::new(base_dir).await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::types::{BookQuery, DISPLAY_PAGE_SIZE};

    fn session(cached: usize, total: usize) -> SearchSession {
        SearchSession {
            query: BookQuery::new("stored query"),
            window: ResultWindow {
                start_index: 0,
                total_results: total,
                cached_count: cached,
            },
            cached: (0..cached).map(|i| Book::titled(format!("Book {}", i))).collect(),
        }
    }

    async fn exercise_round_trip(store: &dyn ResultStore) {
        assert!(store.load("user-1").await.unwrap().is_none());

        let stored = session(5, 12);
        store.replace("user-1", &stored).await.unwrap();
        let loaded = store.load("user-1").await.unwrap().unwrap();
        assert_eq!(loaded, stored);

        // Window-only rewrite.
        let window = ResultWindow {
            start_index: DISPLAY_PAGE_SIZE,
            total_results: 12,
            cached_count: 10,
        };
        store.put_window("user-1", &window).await.unwrap();
        let loaded = store.load("user-1").await.unwrap().unwrap();
        assert_eq!(loaded.window, window);
        assert_eq!(loaded.query, stored.query);
        assert_eq!(loaded.cached.len(), 5);

        // Cache extension.
        let extra: Vec<Book> = (5..10).map(|i| Book::titled(format!("Book {}", i))).collect();
        store.append_items("user-1", 5, &extra).await.unwrap();
        let loaded = store.load("user-1").await.unwrap().unwrap();
        assert_eq!(loaded.cached.len(), 10);
        assert_eq!(loaded.cached[9].title, "Book 9");

        store.clear("user-1").await.unwrap();
        assert!(store.load("user-1").await.unwrap().is_none());
    }

    async fn exercise_user_isolation(store: &dyn ResultStore) {
        store.replace("user-a", &session(5, 12)).await.unwrap();
        store.replace("user-b", &session(3, 3)).await.unwrap();

        store.clear("user-a").await.unwrap();
        assert!(store.load("user-a").await.unwrap().is_none());
        let b = store.load("user-b").await.unwrap().unwrap();
        assert_eq!(b.cached.len(), 3);
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = InMemoryResultStore::new();
        exercise_round_trip(&store).await;
    }

    #[tokio::test]
    async fn memory_store_isolates_users() {
        let store = InMemoryResultStore::new();
        exercise_user_isolation(&store).await;
    }

    #[tokio::test]
    async fn memory_store_rejects_window_update_without_session() {
        let store = InMemoryResultStore::new();
        let window = ResultWindow {
            start_index: 0,
            total_results: 1,
            cached_count: 1,
        };
        let err = store.put_window("nobody", &window).await.unwrap_err();
        assert!(matches!(err, StoreError::SessionMissing(_)));
    }

    #[tokio::test]
    async fn sqlite_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteResultStore::new(dir.path().to_path_buf()).await.unwrap();
        assert!(store.is_persistent());
        exercise_round_trip(&store).await;
    }

    #[tokio::test]
    async fn sqlite_store_isolates_users() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteResultStore::new(dir.path().to_path_buf()).await.unwrap();
        exercise_user_isolation(&store).await;
    }

    #[tokio::test]
    async fn sqlite_store_rejects_window_update_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteResultStore::new(dir.path().to_path_buf()).await.unwrap();
        let window = ResultWindow {
            start_index: 0,
            total_results: 1,
            cached_count: 1,
        };
        let err = store.put_window("nobody", &window).await.unwrap_err();
        assert!(matches!(err, StoreError::SessionMissing(_)));
    }

    #[tokio::test]
    async fn factory_builds_memory_store() {
        let store = create_result_store(StoreKind::Memory, PathBuf::from("/unused"))
            .await
            .unwrap();
        assert!(!store.is_persistent());
    }
}
