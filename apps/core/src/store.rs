//! Narrow read/append seams used by the chat core, with the SQLite implementation.

use crate::database;
use crate::error::AppError;
use crate::models::{ChatMessage, ChatSession, ContentItem, ContentType, NewChatMessage, SessionKey};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

/// Read access to the wellness content library.
///
/// Implementations only return active items.
#[async_trait]
pub trait ContentStore: Send + Sync + 'static {
    /// Active items of `content_type` carrying any of `tags`, newest-updated first.
    async fn find_active_by_type(
        &self,
        content_type: ContentType,
        tags: &[String],
        limit: usize,
    ) -> Result<Vec<ContentItem>, AppError>;

    /// Active resources flagged as emergency, newest-updated first.
    async fn find_active_emergency_resources(&self, limit: usize) -> Result<Vec<ContentItem>, AppError>;
}

/// Append-only chat log, one per (user, session key).
#[async_trait]
pub trait SessionLog: Send + Sync + 'static {
    /// Returns the session, creating it on first use.
    async fn open_session(&self, key: &SessionKey) -> Result<ChatSession, AppError>;

    async fn append_message(&self, key: &SessionKey, message: &NewChatMessage) -> Result<ChatMessage, AppError>;

    /// Merges `topics` into the session themes and replaces its emotional state.
    async fn record_analysis(&self, key: &SessionKey, topics: &[String], emotional_state: &str) -> Result<(), AppError>;

    /// Stores a user message, its reply and the session analysis together.
    ///
    /// The default runs the three steps in sequence. Stores that support
    /// transactions override it so that a failure leaves nothing behind.
    async fn record_exchange(
        &self,
        key: &SessionKey,
        user_message: &NewChatMessage,
        reply: &NewChatMessage,
        topics: &[String],
        emotional_state: &str,
    ) -> Result<(), AppError> {
        self.open_session(key).await?;
        self.append_message(key, user_message).await?;
        self.record_analysis(key, topics, emotional_state).await?;
        self.append_message(key, reply).await?;
        Ok(())
    }
}

/// `ContentStore` and `SessionLog` backed by the SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn find_active_by_type(
        &self,
        content_type: ContentType,
        tags: &[String],
        limit: usize,
    ) -> Result<Vec<ContentItem>, AppError> {
        database::find_active_by_type(&self.pool, content_type, tags, limit).await
    }

    async fn find_active_emergency_resources(&self, limit: usize) -> Result<Vec<ContentItem>, AppError> {
        database::find_active_emergency_resources(&self.pool, limit).await
    }
}

#[async_trait]
impl SessionLog for SqliteStore {
    async fn open_session(&self, key: &SessionKey) -> Result<ChatSession, AppError> {
        database::ensure_session(&self.pool, key).await
    }

    async fn append_message(&self, key: &SessionKey, message: &NewChatMessage) -> Result<ChatMessage, AppError> {
        database::append_message(&self.pool, key, message).await
    }

    async fn record_analysis(&self, key: &SessionKey, topics: &[String], emotional_state: &str) -> Result<(), AppError> {
        database::record_session_analysis(&self.pool, key, topics, emotional_state).await
    }

    async fn record_exchange(
        &self,
        key: &SessionKey,
        user_message: &NewChatMessage,
        reply: &NewChatMessage,
        topics: &[String],
        emotional_state: &str,
    ) -> Result<(), AppError> {
        database::record_exchange(&self.pool, key, user_message, reply, topics, emotional_state).await?;
        Ok(())
    }
}
