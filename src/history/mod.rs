//! Conversation history storage with pluggable backends.
//!
//! Every handled turn is recorded per user so follow-up intents ("what
//! did I say about X") can search back through the conversation. Same
//! backend split as the result store: in-memory and SQLite.

mod memory;
mod sqlite;

pub use memory::InMemoryConversationStore;
pub use sqlite::SqliteConversationStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::{StoreError, StoreKind};

/// One recorded conversational turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    pub id: Uuid,
    pub user_id: String,
    /// What the user said.
    pub user_input: String,
    /// What the assistant replied.
    pub fulfillment: String,
    /// RFC3339 timestamp.
    pub created_at: String,
}

/// Conversation store trait - implemented by all storage backends.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Record a handled turn.
    async fn record(
        &self,
        user_id: &str,
        user_input: &str,
        fulfillment: &str,
    ) -> Result<TurnRecord, StoreError>;

    /// Find the user's turns mentioning `keyword` (case-insensitive
    /// substring match on either side of the exchange), oldest first.
    async fn find_keyword(
        &self,
        user_id: &str,
        keyword: &str,
    ) -> Result<Vec<TurnRecord>, StoreError>;
}

/// Create a conversation store based on type and configuration.
pub async fn create_conversation_store(
    kind: StoreKind,
    base_dir: PathBuf,
) -> Result<Arc<dyn ConversationStore>, StoreError> {
    match kind {
        StoreKind::Memory => Ok(Arc::new(InMemoryConversationStore::new())),
        StoreKind::Sqlite => {
            let store = SqliteConversationStore::new(base_dir).await?;
            Ok(Arc::new(store))
        }
    }
}
