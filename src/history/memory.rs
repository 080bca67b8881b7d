//! In-memory conversation store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ConversationStore, TurnRecord};
use crate::storage::{now_string, StoreError};

#[derive(Clone, Default)]
pub struct InMemoryConversationStore {
    turns: Arc<RwLock<HashMap<String, Vec<TurnRecord>>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn record(
        &self,
        user_id: &str,
        user_input: &str,
        fulfillment: &str,
    ) -> Result<TurnRecord, StoreError> {
        let turn = TurnRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            user_input: user_input.to_string(),
            fulfillment: fulfillment.to_string(),
            created_at: now_string(),
        };
        self.turns
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(turn.clone());
        Ok(turn)
    }

    async fn find_keyword(
        &self,
        user_id: &str,
        keyword: &str,
    ) -> Result<Vec<TurnRecord>, StoreError> {
        let needle = keyword.to_lowercase();
        let turns = self.turns.read().await;
        let hits = turns
            .get(user_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|t| {
                        t.user_input.to_lowercase().contains(&needle)
                            || t.fulfillment.to_lowercase().contains(&needle)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(hits)
    }
}
