//! Chat transcript database operations
//!
//! Handles all database interactions for the chat transcript.

use crate::chat::models::Message;
use crate::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Database connection pool for transcript operations
pub struct ChatDb {
    pool: SqlitePool,
}

impl ChatDb {
    /// Initialize database connection pool
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file (created if missing)
    ///
    /// # Returns
    /// * `Ok(ChatDb)` if successful
    /// * `Err(AppError)` if connection failed
    pub async fn new(db_path: &Path) -> Result<Self, AppError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to create db directory: {}", e))
            })?;
        }

        let connection_string = format!("sqlite:{}", db_path.display());
        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid database path: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to connect to database: {}", e))
            })?;

        info!("Connected to SQLite database at: {}", db_path.display());

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_chat_history.sql");

        // Drop comment lines, then split into statements
        let cleaned_sql: String = migration_sql
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("--"))
            .collect::<Vec<_>>()
            .join(" ");

        for statement in cleaned_sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!(
                        "Migration failed: {} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the transcript in insertion order
    ///
    /// With `limit`, only the most recent `limit` messages are returned
    /// (still oldest first).
    pub async fn get_messages(&self, limit: Option<u32>) -> Result<Vec<Message>, AppError> {
        let query = match limit {
            Some(_) => {
                "SELECT id, role, content, model, provider, created_at FROM (
                    SELECT rowid AS seq, id, role, content, model, provider, created_at
                    FROM messages ORDER BY rowid DESC LIMIT ?
                 ) ORDER BY seq ASC"
            }
            None => {
                "SELECT id, role, content, model, provider, created_at FROM messages ORDER BY rowid ASC"
            }
        };

        let mut q = sqlx::query_as::<_, Message>(query);
        if let Some(limit) = limit {
            q = q.bind(i64::from(limit));
        }

        let messages = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch messages: {}", e)))?;

        Ok(messages)
    }

    /// Append a user message and the assistant's reply atomically
    pub async fn add_exchange(&self, user: &Message, assistant: &Message) -> Result<(), AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to begin transaction: {}", e)))?;

        for message in [user, assistant] {
            sqlx::query(
                "INSERT INTO messages (id, role, content, model, provider, created_at) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&message.id)
            .bind(&message.role)
            .bind(&message.content)
            .bind(&message.model)
            .bind(&message.provider)
            .bind(message.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to add message: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to commit messages: {}", e)))?;

        debug!(user_id = %user.id, assistant_id = %assistant.id, "Stored chat exchange");
        Ok(())
    }

    /// Delete the whole transcript
    /// Returns the number of deleted messages
    pub async fn clear(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM messages")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to clear messages: {}", e)))?;

        debug!(deleted = result.rows_affected(), "Cleared chat transcript");
        Ok(result.rows_affected())
    }
}
