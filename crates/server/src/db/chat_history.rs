//! Database operations for per-user chat history.
//!
//! History is append-only while a user is logged in and purged in full at
//! logout. Callers treat "no rows" and "not logged in" identically: both
//! read back as an empty list.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use medibot_core::{ChatExchangeId, UserId};

use super::RepositoryError;
use crate::models::chat::ChatExchange;

/// Internal row type for `PostgreSQL` chat history queries.
#[derive(Debug, sqlx::FromRow)]
struct ChatExchangeRow {
    id: i32,
    user_id: i32,
    prompt: String,
    response: String,
    created_at: DateTime<Utc>,
}

impl From<ChatExchangeRow> for ChatExchange {
    fn from(row: ChatExchangeRow) -> Self {
        Self {
            id: ChatExchangeId::new(row.id),
            user_id: UserId::new(row.user_id),
            prompt: row.prompt,
            response: row.response,
            created_at: row.created_at,
        }
    }
}

/// Repository for chat history database operations.
pub struct ChatHistoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChatHistoryRepository<'a> {
    /// Create a new chat history repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append one exchange (user prompt + generated response) for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails, including
    /// when the referenced user no longer exists (FK violation).
    pub async fn append(
        &self,
        user_id: UserId,
        prompt: &str,
        response: &str,
    ) -> Result<ChatExchange, RepositoryError> {
        let row = sqlx::query_as::<_, ChatExchangeRow>(
            r"
            INSERT INTO chat_history (user_id, prompt, response)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, prompt, response, created_at
            ",
        )
        .bind(user_id.as_i32())
        .bind(prompt)
        .bind(response)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get all exchanges for a user, oldest first.
    ///
    /// Returns an empty vec when the user has no history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for(&self, user_id: UserId) -> Result<Vec<ChatExchange>, RepositoryError> {
        let rows = sqlx::query_as::<_, ChatExchangeRow>(
            r"
            SELECT id, user_id, prompt, response, created_at
            FROM chat_history
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Delete all exchanges owned by a user.
    ///
    /// Idempotent: purging a user with no rows is a no-op.
    ///
    /// # Returns
    ///
    /// The number of rows removed (for logging only).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn purge(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM chat_history
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
