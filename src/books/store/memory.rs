//! In-memory result store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ResultStore;
use crate::books::types::{Book, ResultWindow, SearchSession};
use crate::storage::StoreError;

#[derive(Clone, Default)]
pub struct InMemoryResultStore {
    sessions: Arc<RwLock<HashMap<String, SearchSession>>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn load(&self, user_id: &str) -> Result<Option<SearchSession>, StoreError> {
        Ok(self.sessions.read().await.get(user_id).cloned())
    }

    async fn replace(&self, user_id: &str, session: &SearchSession) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(user_id.to_string(), session.clone());
        Ok(())
    }

    async fn put_window(&self, user_id: &str, window: &ResultWindow) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(user_id)
            .ok_or_else(|| StoreError::SessionMissing(user_id.to_string()))?;
        session.window = *window;
        Ok(())
    }

    async fn append_items(
        &self,
        user_id: &str,
        position: usize,
        items: &[Book],
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(user_id)
            .ok_or_else(|| StoreError::SessionMissing(user_id.to_string()))?;
        // Positions are append-only per query; re-appending an overlapping
        // range rewrites the tail.
        session.cached.truncate(position);
        session.cached.extend_from_slice(items);
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> Result<(), StoreError> {
        self.sessions.write().await.remove(user_id);
        Ok(())
    }
}
