use super::now_millis;
use crate::error::AppError;
use crate::models::{ChatMessage, ChatSession, ChatSessionWithMessages, NewChatMessage, SessionFeedback, SessionKey};
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::types::Json;
use validator::Validate;

const SESSION_COLUMNS: &str = "id, user_id, session_key, detected_themes, emotional_state, \
    feedback_helpful, feedback_comments, feedback_at, created_at, updated_at";

const MESSAGE_COLUMNS: &str = "id, chat_session_id, sender, content, content_type, content_id, \
    detected_emotions, flagged_as_crisis, additional_data, created_at";

/// Appends topics not already present, keeping first-seen order.
pub fn merge_themes(mut existing: Vec<String>, topics: &[String]) -> Vec<String> {
    for topic in topics {
        if !existing.contains(topic) {
            existing.push(topic.clone());
        }
    }
    existing
}

// --- Sessions ---

pub async fn find_session(pool: &SqlitePool, key: &SessionKey) -> Result<Option<ChatSession>, AppError> {
    let mut conn = pool.acquire().await?;
    fetch_session(&mut conn, key).await
}

async fn fetch_session(conn: &mut SqliteConnection, key: &SessionKey) -> Result<Option<ChatSession>, AppError> {
    let session = sqlx::query_as::<_, ChatSession>(&format!(
        "SELECT {} FROM chat_sessions WHERE user_id = ? AND session_key = ?",
        SESSION_COLUMNS
    ))
    .bind(key.user_id)
    .bind(&key.session_key)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(session)
}

/// Returns the session for `key`, creating an empty one on first use.
pub async fn ensure_session(pool: &SqlitePool, key: &SessionKey) -> Result<ChatSession, AppError> {
    let mut conn = pool.acquire().await?;
    upsert_session(&mut conn, key).await
}

async fn upsert_session(conn: &mut SqliteConnection, key: &SessionKey) -> Result<ChatSession, AppError> {
    if key.session_key.trim().is_empty() {
        return Err(AppError::Validation("Session key is required".to_string()));
    }

    let now = now_millis();
    sqlx::query(
        r#"
        INSERT INTO chat_sessions (user_id, session_key, detected_themes, emotional_state, created_at, updated_at)
        VALUES (?, ?, '[]', 'undefined', ?, ?)
        ON CONFLICT (user_id, session_key) DO NOTHING
        "#,
    )
    .bind(key.user_id)
    .bind(&key.session_key)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    fetch_session(conn, key)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Session {} missing after insert", key.session_key)))
}

/// Sessions of a user, most recently active first.
pub async fn list_sessions(pool: &SqlitePool, user_id: i64, limit: i64, offset: i64) -> Result<Vec<ChatSession>, AppError> {
    let sessions = sqlx::query_as::<_, ChatSession>(&format!(
        r#"
        SELECT {}
        FROM chat_sessions
        WHERE user_id = ?
        ORDER BY updated_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
        SESSION_COLUMNS
    ))
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(sessions)
}

pub async fn get_session_with_messages(pool: &SqlitePool, key: &SessionKey) -> Result<ChatSessionWithMessages, AppError> {
    let session = find_session(pool, key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chat session {} not found", key.session_key)))?;
    let messages = get_session_messages(pool, session.id).await?;
    Ok(ChatSessionWithMessages { session, messages })
}

pub async fn record_session_analysis(
    pool: &SqlitePool,
    key: &SessionKey,
    topics: &[String],
    emotional_state: &str,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    let session = upsert_session(&mut tx, key).await?;
    apply_analysis(&mut tx, session, topics, emotional_state, now_millis()).await?;
    tx.commit().await?;
    Ok(())
}

async fn apply_analysis(
    conn: &mut SqliteConnection,
    session: ChatSession,
    topics: &[String],
    emotional_state: &str,
    now: i64,
) -> Result<(), AppError> {
    let themes = merge_themes(session.detected_themes.0, topics);

    sqlx::query(
        r#"
        UPDATE chat_sessions
        SET detected_themes = ?, emotional_state = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(Json(&themes))
    .bind(emotional_state)
    .bind(now)
    .bind(session.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn add_session_feedback(
    pool: &SqlitePool,
    key: &SessionKey,
    feedback: &SessionFeedback,
) -> Result<ChatSession, AppError> {
    feedback.validate()?;

    let now = now_millis();
    let result = sqlx::query(
        r#"
        UPDATE chat_sessions
        SET feedback_helpful = ?, feedback_comments = ?, feedback_at = ?, updated_at = ?
        WHERE user_id = ? AND session_key = ?
        "#,
    )
    .bind(feedback.helpful)
    .bind(&feedback.comments)
    .bind(now)
    .bind(now)
    .bind(key.user_id)
    .bind(&key.session_key)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Chat session {} not found", key.session_key)));
    }

    find_session(pool, key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chat session {} not found", key.session_key)))
}

// --- Messages ---

/// Appends a message to the session log (creating the session if needed).
pub async fn append_message(pool: &SqlitePool, key: &SessionKey, message: &NewChatMessage) -> Result<ChatMessage, AppError> {
    let now = now_millis();

    let mut tx = pool.begin().await?;
    let session = upsert_session(&mut tx, key).await?;
    let stored = insert_message(&mut tx, session.id, message, now).await?;

    sqlx::query("UPDATE chat_sessions SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(session.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(stored)
}

/// Stores one full exchange in a single transaction: the user message, the bot
/// reply and the session analysis. Either all of it lands or none of it does.
pub async fn record_exchange(
    pool: &SqlitePool,
    key: &SessionKey,
    user_message: &NewChatMessage,
    reply: &NewChatMessage,
    topics: &[String],
    emotional_state: &str,
) -> Result<(ChatMessage, ChatMessage), AppError> {
    let now = now_millis();

    let mut tx = pool.begin().await?;
    let session = upsert_session(&mut tx, key).await?;
    let session_id = session.id;
    let stored_user = insert_message(&mut tx, session_id, user_message, now).await?;
    let stored_reply = insert_message(&mut tx, session_id, reply, now).await?;
    apply_analysis(&mut tx, session, topics, emotional_state, now).await?;
    tx.commit().await?;

    Ok((stored_user, stored_reply))
}

async fn insert_message(
    conn: &mut SqliteConnection,
    chat_session_id: i64,
    message: &NewChatMessage,
    now: i64,
) -> Result<ChatMessage, AppError> {
    let stored = sqlx::query_as::<_, ChatMessage>(&format!(
        r#"
        INSERT INTO chat_messages
            (chat_session_id, sender, content, content_type, content_id, detected_emotions, flagged_as_crisis, additional_data, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        MESSAGE_COLUMNS
    ))
    .bind(chat_session_id)
    .bind(message.sender)
    .bind(&message.content)
    .bind(message.content_type)
    .bind(message.content_id)
    .bind(Json(&message.detected_emotions))
    .bind(message.flagged_as_crisis)
    .bind(Json(&message.additional_data))
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(stored)
}

pub async fn get_session_messages(pool: &SqlitePool, chat_session_id: i64) -> Result<Vec<ChatMessage>, AppError> {
    let messages = sqlx::query_as::<_, ChatMessage>(&format!(
        "SELECT {} FROM chat_messages WHERE chat_session_id = ? ORDER BY id ASC",
        MESSAGE_COLUMNS
    ))
    .bind(chat_session_id)
    .fetch_all(pool)
    .await?;
    Ok(messages)
}
