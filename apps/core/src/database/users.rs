use super::now_millis;
use crate::error::AppError;
use crate::models::{NewUser, User, UserPreferences};
use sqlx::sqlite::SqlitePool;
use sqlx::types::Json;
use tracing::info;
use validator::Validate;

const USER_COLUMNS: &str = "id, name, email, is_admin, preferences, created_at, updated_at";

pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> Result<User, AppError> {
    new_user.validate()?;
    let email = new_user.email.trim().to_lowercase();

    if get_user_by_email(pool, &email).await?.is_some() {
        return Err(AppError::Conflict(format!("User {} already exists", email)));
    }

    let now = now_millis();
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (name, email, is_admin, preferences, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(new_user.name.trim())
    .bind(&email)
    .bind(new_user.is_admin)
    .bind(Json(UserPreferences::default()))
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    info!("Created user {}", user.id);
    Ok(user)
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Returns the user with `email`, creating it when absent.
pub async fn ensure_user(pool: &SqlitePool, name: &str, email: &str) -> Result<User, AppError> {
    if let Some(user) = get_user_by_email(pool, email).await? {
        return Ok(user);
    }
    create_user(
        pool,
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            is_admin: false,
        },
    )
    .await
}

pub async fn update_preferences(pool: &SqlitePool, id: i64, preferences: &UserPreferences) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET preferences = ?, updated_at = ? WHERE id = ? RETURNING {}",
        USER_COLUMNS
    ))
    .bind(Json(preferences))
    .bind(now_millis())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
}
