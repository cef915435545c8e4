use super::now_millis;
use crate::error::AppError;
use crate::models::{ContentDetails, ContentFilter, ContentItem, ContentType, ContentUpdate, NewContent};
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::types::Json;
use sqlx::{FromRow, QueryBuilder};
use tracing::info;

#[derive(FromRow)]
struct ContentRow {
    id: i64,
    details: Json<ContentDetails>,
    active: bool,
    created_by: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

const CONTENT_COLUMNS: &str = "c.id, c.details, c.active, c.created_by, c.created_at, c.updated_at";

/// Trims tags, drops empty ones and removes duplicates (first occurrence wins).
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !normalized.iter().any(|t| t == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

async fn insert_tags(conn: &mut SqliteConnection, content_id: i64, tags: &[String]) -> Result<(), AppError> {
    for tag in tags {
        sqlx::query("INSERT OR IGNORE INTO content_tags (content_id, tag) VALUES (?, ?)")
            .bind(content_id)
            .bind(tag)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn load_tags(pool: &SqlitePool, content_id: i64) -> Result<Vec<String>, AppError> {
    let tags = sqlx::query_scalar::<_, String>("SELECT tag FROM content_tags WHERE content_id = ? ORDER BY id ASC")
        .bind(content_id)
        .fetch_all(pool)
        .await?;
    Ok(tags)
}

async fn hydrate(pool: &SqlitePool, rows: Vec<ContentRow>) -> Result<Vec<ContentItem>, AppError> {
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let tags = load_tags(pool, row.id).await?;
        items.push(ContentItem {
            id: row.id,
            tags,
            active: row.active,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            details: row.details.0,
        });
    }
    Ok(items)
}

// --- Content CRUD ---

pub async fn create_content(pool: &SqlitePool, new: NewContent) -> Result<ContentItem, AppError> {
    new.details.check()?;
    let tags = normalize_tags(&new.tags);
    let now = now_millis();

    let mut tx = pool.begin().await?;
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO wellness_content (content_type, details, is_emergency, active, created_by, created_at, updated_at)
        VALUES (?, ?, ?, 1, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(new.details.content_type())
    .bind(Json(&new.details))
    .bind(new.details.is_emergency())
    .bind(new.created_by)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;
    insert_tags(&mut *tx, id, &tags).await?;
    tx.commit().await?;

    info!("Created {} content {}", new.details.content_type(), id);
    get_content(pool, id).await
}

/// Fetches an item whether or not it is active.
pub async fn get_content(pool: &SqlitePool, id: i64) -> Result<ContentItem, AppError> {
    let row = sqlx::query_as::<_, ContentRow>(&format!(
        "SELECT {} FROM wellness_content c WHERE c.id = ?",
        CONTENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Content {} not found", id)))?;

    let mut items = hydrate(pool, vec![row]).await?;
    items
        .pop()
        .ok_or_else(|| AppError::Internal(format!("Content {} vanished while loading", id)))
}

/// Lists content matching `filter`, newest-updated first.
pub async fn list_content(pool: &SqlitePool, filter: &ContentFilter) -> Result<Vec<ContentItem>, AppError> {
    let tags = normalize_tags(&filter.tags);

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("SELECT DISTINCT {} FROM wellness_content c", CONTENT_COLUMNS));
    if !tags.is_empty() {
        qb.push(" JOIN content_tags t ON t.content_id = c.id");
    }
    qb.push(" WHERE 1 = 1");
    if !filter.include_inactive {
        qb.push(" AND c.active = 1");
    }
    if let Some(content_type) = filter.content_type {
        qb.push(" AND c.content_type = ").push_bind(content_type);
    }
    if let Some(difficulty) = filter.difficulty {
        qb.push(" AND json_extract(c.details, '$.difficulty') = ")
            .push_bind(difficulty.as_str());
    }
    if !tags.is_empty() {
        qb.push(" AND t.tag IN (");
        let mut separated = qb.separated(", ");
        for tag in &tags {
            separated.push_bind(tag.clone());
        }
        separated.push_unseparated(")");
    }
    qb.push(" ORDER BY c.updated_at DESC, c.id DESC LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);

    let rows: Vec<ContentRow> = qb.build_query_as::<ContentRow>().fetch_all(pool).await?;
    hydrate(pool, rows).await
}

/// Active items of one type sharing at least one of `tags`, newest-updated first.
pub async fn find_active_by_type(
    pool: &SqlitePool,
    content_type: ContentType,
    tags: &[String],
    limit: usize,
) -> Result<Vec<ContentItem>, AppError> {
    let filter = ContentFilter {
        content_type: Some(content_type),
        tags: tags.to_vec(),
        limit: i64::try_from(limit).unwrap_or(i64::MAX),
        ..ContentFilter::default()
    };
    list_content(pool, &filter).await
}

pub async fn find_active_emergency_resources(pool: &SqlitePool, limit: usize) -> Result<Vec<ContentItem>, AppError> {
    let rows = sqlx::query_as::<_, ContentRow>(&format!(
        r#"
        SELECT {}
        FROM wellness_content c
        WHERE c.content_type = 'resource' AND c.is_emergency = 1 AND c.active = 1
        ORDER BY c.updated_at DESC, c.id DESC
        LIMIT ?
        "#,
        CONTENT_COLUMNS
    ))
    .bind(i64::try_from(limit).unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await?;
    hydrate(pool, rows).await
}

/// Applies a partial update. Details must keep the item's content type; tags are replaced.
pub async fn update_content(pool: &SqlitePool, id: i64, update: ContentUpdate) -> Result<ContentItem, AppError> {
    let current = get_content(pool, id).await?;

    if let Some(details) = &update.details {
        if details.content_type() != current.content_type() {
            return Err(AppError::Validation(format!(
                "Cannot change content {} from {} to {}",
                id,
                current.content_type(),
                details.content_type()
            )));
        }
        details.check()?;
    }

    let details = update.details.unwrap_or(current.details);
    let active = update.active.unwrap_or(current.active);

    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        UPDATE wellness_content
        SET details = ?, is_emergency = ?, active = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(Json(&details))
    .bind(details.is_emergency())
    .bind(active)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(tags) = &update.tags {
        sqlx::query("DELETE FROM content_tags WHERE content_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_tags(&mut *tx, id, &normalize_tags(tags)).await?;
    }
    tx.commit().await?;

    get_content(pool, id).await
}

/// Soft delete: the item stays in the table with `active = false`.
pub async fn deactivate_content(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE wellness_content SET active = 0, updated_at = ? WHERE id = ?")
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Content {} not found", id)));
    }
    info!("Deactivated content {}", id);
    Ok(())
}

pub async fn count_content(pool: &SqlitePool) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM wellness_content")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
