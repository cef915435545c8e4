use super::{get_user, now_millis};
use crate::error::AppError;
use crate::models::{MoodEntry, MoodInput};
use sqlx::sqlite::SqlitePool;
use validator::Validate;

/// Records a mood entry and returns the user's full history, newest first.
pub async fn add_mood_entry(pool: &SqlitePool, user_id: i64, input: &MoodInput) -> Result<Vec<MoodEntry>, AppError> {
    input.validate()?;
    get_user(pool, user_id).await?;

    sqlx::query("INSERT INTO mood_entries (user_id, mood, note, recorded_at) VALUES (?, ?, ?, ?)")
        .bind(user_id)
        .bind(input.mood)
        .bind(input.note.trim())
        .bind(now_millis())
        .execute(pool)
        .await?;

    mood_history(pool, user_id).await
}

pub async fn mood_history(pool: &SqlitePool, user_id: i64) -> Result<Vec<MoodEntry>, AppError> {
    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT id, user_id, mood, note, recorded_at
        FROM mood_entries
        WHERE user_id = ?
        ORDER BY recorded_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}
