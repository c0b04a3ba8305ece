//! Chat database operations
//!
//! Handles all database interactions for chat sessions and messages.
//! Every public operation is its own transaction; callers never rely on
//! atomicity across two calls.

use crate::chat::models::{ChatSession, Message, MessageRole, SessionId};
use crate::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Database connection pool for chat operations
pub struct ChatDb {
    pool: SqlitePool,
}

impl ChatDb {
    /// Initialize database connection pool
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Returns
    /// * `Ok(ChatDb)` if successful
    /// * `Err(AppError)` if connection failed
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Ensure parent directory exists
        if let Some(parent) = PathBuf::from(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Storage(format!("Failed to create db directory: {}", e))
                })?;
            }
        }

        // SQLite connection string format: sqlite://path/to/db.db
        let connection_string = if db_path.starts_with("sqlite:") {
            db_path.to_string()
        } else {
            format!("sqlite:{}", db_path)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::storage("Invalid database path", e))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::storage("Failed to connect to database", e))?;

        info!("Connected to SQLite database at: {}", db_path);

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_chats.sql");

        for statement in split_statements(migration_sql) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Storage(format!(
                        "Migration failed: {} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Create a new session with an empty message list
    pub async fn create_session(&self, title: &str) -> Result<SessionId, AppError> {
        let created_at = chrono::Utc::now().timestamp();
        let result = sqlx::query("INSERT INTO chat_sessions (title, created_at) VALUES (?, ?)")
            .bind(title)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to create session", e))?;

        let id = result.last_insert_rowid();
        debug!(session_id = id, "Created chat session");
        Ok(id)
    }

    /// Get a session by ID
    pub async fn get_session(&self, id: SessionId) -> Result<Option<ChatSession>, AppError> {
        sqlx::query_as::<_, ChatSession>(
            "SELECT id, title, created_at FROM chat_sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to fetch session", e))
    }

    /// Get all sessions in store order
    ///
    /// Sorting for display is up to the caller; ids are orderable by recency.
    pub async fn list_sessions(&self) -> Result<Vec<ChatSession>, AppError> {
        sqlx::query_as::<_, ChatSession>("SELECT id, title, created_at FROM chat_sessions")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to fetch sessions", e))
    }

    /// Append a message to a session
    ///
    /// Fails with `AppError::SessionNotFound` without writing anything when the
    /// session does not exist.
    pub async fn append_message(
        &self,
        session_id: SessionId,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::storage("Failed to begin transaction", e))?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM chat_sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::storage("Failed to look up session", e))?;

        if exists.is_none() {
            return Err(AppError::SessionNotFound(session_id));
        }

        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO chat_messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?) \
             RETURNING id, session_id, role, content, created_at",
        )
        .bind(session_id)
        .bind(role)
        .bind(content)
        .bind(chrono::Utc::now().timestamp())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::storage("Failed to add message", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::storage("Failed to commit message", e))?;

        debug!(
            message_id = message.id,
            session_id = session_id,
            role = %role,
            "Appended message"
        );
        Ok(message)
    }

    /// Get all messages for a session in creation order
    ///
    /// Unknown sessions yield an empty list.
    pub async fn list_messages(&self, session_id: SessionId) -> Result<Vec<Message>, AppError> {
        sqlx::query_as::<_, Message>(
            "SELECT id, session_id, role, content, created_at FROM chat_messages \
             WHERE session_id = ? ORDER BY id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to fetch messages", e))
    }

    /// Get the most recently created message of a session, if any
    pub async fn last_message(&self, session_id: SessionId) -> Result<Option<Message>, AppError> {
        sqlx::query_as::<_, Message>(
            "SELECT id, session_id, role, content, created_at FROM chat_messages \
             WHERE session_id = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to fetch last message", e))
    }

    /// Close all pooled connections, flushing pending writes
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Split a migration script into executable statements
///
/// Drops comment-only lines and trailing `--` comments, then splits on `;`.
fn split_statements(sql: &str) -> Vec<String> {
    let mut cleaned_sql = String::new();
    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        let without_comments = match trimmed.find("--") {
            Some(comment_pos) => &trimmed[..comment_pos],
            None => trimmed,
        };
        cleaned_sql.push_str(without_comments.trim());
        cleaned_sql.push(' ');
    }

    cleaned_sql
        .split(';')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
