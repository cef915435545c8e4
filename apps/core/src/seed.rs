//! Starter content library, inserted into an empty database.

use crate::database::{count_content, create_content};
use crate::error::AppError;
use crate::models::NewContent;
use sqlx::sqlite::SqlitePool;
use tracing::info;

const SEED_CONTENT: &str = include_str!("../seed/wellness_content.json");

/// Parses the bundled starter library.
pub fn starter_content() -> Result<Vec<NewContent>, AppError> {
    Ok(serde_json::from_str(SEED_CONTENT)?)
}

/// Inserts the starter library when no content exists yet. Returns the number of items inserted.
pub async fn seed_content(pool: &SqlitePool) -> Result<usize, AppError> {
    let existing = count_content(pool).await?;
    if existing > 0 {
        info!("Content library already holds {} items, skipping seed", existing);
        return Ok(0);
    }

    let items = starter_content()?;
    let total = items.len();
    for item in items {
        create_content(pool, item).await?;
    }

    info!("Seeded {} content items", total);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;

    #[test]
    fn test_starter_content_parses_and_is_valid() {
        let items = starter_content().expect("seed file should parse");
        assert!(!items.is_empty());
        for item in &items {
            item.details.check().expect("seed item should be valid");
            assert!(!item.tags.is_empty());
        }
    }

    #[test]
    fn test_starter_content_covers_every_type() {
        let items = starter_content().unwrap();
        for content_type in [ContentType::Quote, ContentType::Exercise, ContentType::Technique, ContentType::Resource] {
            assert!(items.iter().any(|i| i.details.content_type() == content_type), "missing {}", content_type);
        }
        assert!(items.iter().any(|i| i.details.is_emergency()));
        assert!(items.iter().any(|i| i.tags.iter().any(|t| t == "general")));
    }
}
