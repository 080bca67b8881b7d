//! Shared storage plumbing for the pluggable per-user stores.
//!
//! Both the book result store and the conversation history store come in an
//! in-memory flavor (non-persistent, for tests and ephemeral deployments)
//! and a SQLite flavor. This module holds the pieces they share: the error
//! type, the backend selector, and the timestamp helper.

use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A window-only update was attempted but no search session exists for
    /// the user.
    #[error("no stored search session for user {0}")]
    SessionMissing(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    Memory,
    #[default]
    Sqlite,
}

impl StoreKind {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }
}

/// Get current timestamp as RFC3339 string.
pub fn now_string() -> String {
    chrono::Utc::now().to_rfc3339()
}
