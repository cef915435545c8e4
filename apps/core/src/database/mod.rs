//! SQLite persistence: pool setup plus CRUD for users, content, chat logs, moods and favorites.

mod chat;
mod content;
mod favorites;
mod mood;
mod users;

pub use chat::*;
pub use content::*;
pub use favorites::*;
pub use mood::*;
pub use users::*;

use crate::error::AppError;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

/// Opens (creating if needed) the database at `database_url` and applies migrations.
pub async fn init_db(database_url: &str) -> Result<SqlitePool, AppError> {
    info!("Initializing database at: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every connection to an in-memory database is a separate database.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("Database initialized and migrations applied.");

    Ok(pool)
}

/// Current Unix time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
