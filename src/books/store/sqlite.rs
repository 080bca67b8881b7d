//! SQLite-based result store.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use super::ResultStore;
use crate::books::types::{Book, BookQuery, ResultWindow, SearchSession};
use crate::storage::{now_string, StoreError};

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS book_queries (
    user_id TEXT PRIMARY KEY NOT NULL,
    query_json TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS result_windows (
    user_id TEXT PRIMARY KEY NOT NULL,
    start_index INTEGER NOT NULL,
    total_results INTEGER NOT NULL,
    cached_count INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cached_books (
    user_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    book_json TEXT NOT NULL,
    PRIMARY KEY (user_id, position)
);
"#;

pub struct SqliteResultStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteResultStore {
    pub async fn new(base_dir: PathBuf) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(&base_dir).await?;
        let db_path = base_dir.join("results.db");

        // Open database in blocking task
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
impl ResultStore for SqliteResultStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn load(&self, user_id: &str) -> Result<Option<SearchSession>, StoreError> {
        let conn = self.conn.lock().await;

        let query_json: Option<String> = conn
            .query_row(
                "SELECT query_json FROM book_queries WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(query_json) = query_json else {
            return Ok(None);
        };
        let query: BookQuery = serde_json::from_str(&query_json)?;

        let window: Option<ResultWindow> = conn
            .query_row(
                "SELECT start_index, total_results, cached_count
                 FROM result_windows WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(ResultWindow {
                        start_index: row.get::<_, i64>(0)? as usize,
                        total_results: row.get::<_, i64>(1)? as usize,
                        cached_count: row.get::<_, i64>(2)? as usize,
                    })
                },
            )
            .optional()?;
        let Some(window) = window else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT book_json FROM cached_books WHERE user_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        let mut cached = Vec::new();
        for row in rows {
            let book: Book = serde_json::from_str(&row?)?;
            cached.push(book);
        }

        Ok(Some(SearchSession {
            query,
            window,
            cached,
        }))
    }

    async fn replace(&self, user_id: &str, session: &SearchSession) -> Result<(), StoreError> {
        let query_json = serde_json::to_string(&session.query)?;
        let mut book_rows = Vec::with_capacity(session.cached.len());
        for (position, book) in session.cached.iter().enumerate() {
            book_rows.push((position as i64, serde_json::to_string(book)?));
        }
        let now = now_string();

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM book_queries WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM result_windows WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM cached_books WHERE user_id = ?1", params![user_id])?;
        tx.execute(
            "INSERT INTO book_queries (user_id, query_json, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, query_json, now],
        )?;
        tx.execute(
            "INSERT INTO result_windows
             (user_id, start_index, total_results, cached_count, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                session.window.start_index as i64,
                session.window.total_results as i64,
                session.window.cached_count as i64,
                now
            ],
        )?;
        for (position, book_json) in &book_rows {
            tx.execute(
                "INSERT INTO cached_books (user_id, position, book_json) VALUES (?1, ?2, ?3)",
                params![user_id, position, book_json],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn put_window(&self, user_id: &str, window: &ResultWindow) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE result_windows
             SET start_index = ?2, total_results = ?3, cached_count = ?4, updated_at = ?5
             WHERE user_id = ?1",
            params![
                user_id,
                window.start_index as i64,
                window.total_results as i64,
                window.cached_count as i64,
                now_string()
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::SessionMissing(user_id.to_string()));
        }
        Ok(())
    }

    async fn append_items(
        &self,
        user_id: &str,
        position: usize,
        items: &[Book],
    ) -> Result<(), StoreError> {
        let mut book_rows = Vec::with_capacity(items.len());
        for (offset, book) in items.iter().enumerate() {
            book_rows.push(((position + offset) as i64, serde_json::to_string(book)?));
        }

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        for (position, book_json) in &book_rows {
            tx.execute(
                "INSERT OR REPLACE INTO cached_books (user_id, position, book_json)
                 VALUES (?1, ?2, ?3)",
                params![user_id, position, book_json],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM book_queries WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM result_windows WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM cached_books WHERE user_id = ?1", params![user_id])?;
        tx.commit()?;
        Ok(())
    }
}
