use super::{get_content, now_millis};
use crate::error::AppError;
use crate::models::{Favorite, FavoriteWithContent};
use sqlx::sqlite::SqlitePool;

const FAVORITE_COLUMNS: &str = "id, user_id, content_id, notes, created_at, updated_at";

/// Favorites of a user with their content, most recently touched first.
pub async fn list_favorites(pool: &SqlitePool, user_id: i64) -> Result<Vec<FavoriteWithContent>, AppError> {
    let favorites = sqlx::query_as::<_, Favorite>(&format!(
        "SELECT {} FROM favorites WHERE user_id = ? ORDER BY updated_at DESC, id DESC",
        FAVORITE_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut result = Vec::with_capacity(favorites.len());
    for favorite in favorites {
        let content = get_content(pool, favorite.content_id).await?;
        result.push(FavoriteWithContent { favorite, content });
    }
    Ok(result)
}

pub async fn check_favorite(pool: &SqlitePool, user_id: i64, content_id: i64) -> Result<Option<Favorite>, AppError> {
    let favorite = sqlx::query_as::<_, Favorite>(&format!(
        "SELECT {} FROM favorites WHERE user_id = ? AND content_id = ?",
        FAVORITE_COLUMNS
    ))
    .bind(user_id)
    .bind(content_id)
    .fetch_optional(pool)
    .await?;
    Ok(favorite)
}

pub async fn add_favorite(
    pool: &SqlitePool,
    user_id: i64,
    content_id: i64,
    notes: Option<String>,
) -> Result<Favorite, AppError> {
    get_content(pool, content_id).await?;

    if check_favorite(pool, user_id, content_id).await?.is_some() {
        return Err(AppError::Conflict(format!("Content {} already in favorites", content_id)));
    }

    let now = now_millis();
    let favorite = sqlx::query_as::<_, Favorite>(&format!(
        r#"
        INSERT INTO favorites (user_id, content_id, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        FAVORITE_COLUMNS
    ))
    .bind(user_id)
    .bind(content_id)
    .bind(notes)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(favorite)
}

pub async fn update_favorite_notes(
    pool: &SqlitePool,
    user_id: i64,
    favorite_id: i64,
    notes: Option<String>,
) -> Result<Favorite, AppError> {
    sqlx::query_as::<_, Favorite>(&format!(
        "UPDATE favorites SET notes = ?, updated_at = ? WHERE id = ? AND user_id = ? RETURNING {}",
        FAVORITE_COLUMNS
    ))
    .bind(notes)
    .bind(now_millis())
    .bind(favorite_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Favorite {} not found", favorite_id)))
}

pub async fn remove_favorite(pool: &SqlitePool, user_id: i64, favorite_id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM favorites WHERE id = ? AND user_id = ?")
        .bind(favorite_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Favorite {} not found", favorite_id)));
    }
    Ok(())
}
