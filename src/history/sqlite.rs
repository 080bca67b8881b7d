//! SQLite-based conversation store.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ConversationStore, TurnRecord};
use crate::storage::{now_string, StoreError};

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS conversation_turns (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL,
    seq INTEGER NOT NULL,
    user_input TEXT NOT NULL,
    fulfillment TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_turns_user_seq ON conversation_turns(user_id, seq);
"#;

pub struct SqliteConversationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteConversationStore {
    pub async fn new(base_dir: PathBuf) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(&base_dir).await?;
        let db_path = base_dir.join("history.db");

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SCHEMA)?;
            Ok::<_, rusqlite::Error>(conn)
        })
        .await
        .map_err(|e| StoreError::Database(format!("Task join error: {}", e)))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    fn is_persistent(&self) -> bool {
        true
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

        let conn = self.conn.lock().await;
        let next_seq: i64 = conn.query_row(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM conversation_turns WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        conn.execute(
            "INSERT INTO conversation_turns (id, user_id, seq, user_input, fulfillment, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                turn.id.to_string(),
                turn.user_id,
                next_seq,
                turn.user_input,
                turn.fulfillment,
                turn.created_at
            ],
        )?;
        Ok(turn)
    }

    async fn find_keyword(
        &self,
        user_id: &str,
        keyword: &str,
    ) -> Result<Vec<TurnRecord>, StoreError> {
        let needle = format!("%{}%", keyword.to_lowercase());
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, user_input, fulfillment, created_at
             FROM conversation_turns
             WHERE user_id = ?1
               AND (LOWER(user_input) LIKE ?2 OR LOWER(fulfillment) LIKE ?2)
             ORDER BY seq ASC",
        )?;
        let rows = stmt.query_map(params![user_id, needle], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut hits = Vec::new();
        for row in rows {
            let (id, user_id, user_input, fulfillment, created_at) = row?;
            hits.push(TurnRecord {
                id: Uuid::parse_str(&id)
                    .map_err(|e| StoreError::Database(format!("Invalid turn id: {}", e)))?,
                user_id,
                user_input,
                fulfillment,
                created_at,
            });
        }
        Ok(hits)
    }
}
