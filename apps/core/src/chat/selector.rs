//! Response selector: weighted random content type, topic-matched query, uniform pick.

use crate::brain::{AnalysisResult, GENERAL_TOPIC};
use crate::error::AppError;
use crate::models::{ContentPreferences, ContentType};
use crate::store::ContentStore;
use rand::Rng;
use std::sync::Mutex;
use tracing::debug;

use super::response::SelectedResponse;

/// Maximum number of candidates fetched per query.
pub const CANDIDATE_LIMIT: usize = 5;

const QUOTE_THRESHOLD: f64 = 0.3;
const EXERCISE_THRESHOLD: f64 = 0.6;

const ALL_TYPES: [ContentType; 3] = [ContentType::Quote, ContentType::Exercise, ContentType::Technique];

/// Content types allowed by the user's preferences; all three when none is enabled.
pub fn candidate_types(preferences: &ContentPreferences) -> Vec<ContentType> {
    let mut types = Vec::with_capacity(3);
    if preferences.quotes {
        types.push(ContentType::Quote);
    }
    if preferences.exercises {
        types.push(ContentType::Exercise);
    }
    if preferences.techniques {
        types.push(ContentType::Technique);
    }
    if types.is_empty() {
        types.extend(ALL_TYPES);
    }
    types
}

/// Fixed 30/30/40 split of a draw in `[0, 1)`.
pub fn weighted_content_type(r: f64) -> ContentType {
    if r < QUOTE_THRESHOLD {
        ContentType::Quote
    } else if r < EXERCISE_THRESHOLD {
        ContentType::Exercise
    } else {
        ContentType::Technique
    }
}

/// Picks a reply for a non-crisis message.
///
/// The random source is locked only while drawing, never across a store call.
pub struct ResponseSelector<R> {
    rng: Mutex<R>,
}

impl<R: Rng + Send> ResponseSelector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng: Mutex::new(rng) }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut R) -> T) -> Result<T, AppError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal("Random source lock poisoned".to_string()))?;
        Ok(f(&mut rng))
    }

    /// Weighted draw, overridden by a uniform pick among `candidates` when it falls outside them.
    pub fn choose_content_type(&self, preferences: &ContentPreferences) -> Result<ContentType, AppError> {
        let candidates = candidate_types(preferences);
        self.with_rng(|rng| {
            let picked = weighted_content_type(rng.gen::<f64>());
            if candidates.contains(&picked) {
                picked
            } else {
                candidates[rng.gen_range(0..candidates.len())]
            }
        })
    }

    pub async fn select_response<S>(
        &self,
        analysis: &AnalysisResult,
        preferences: &ContentPreferences,
        store: &S,
    ) -> Result<SelectedResponse, AppError>
    where
        S: ContentStore + ?Sized,
    {
        let content_type = self.choose_content_type(preferences)?;
        let primary_topic = analysis.primary_topic().to_string();

        let topic_tags = vec![primary_topic.clone(), GENERAL_TOPIC.to_string()];
        let mut candidates = store
            .find_active_by_type(content_type, &topic_tags, CANDIDATE_LIMIT)
            .await?;

        if candidates.is_empty() {
            debug!("No {} content tagged '{}', retrying with general", content_type, primary_topic);
            candidates = store
                .find_active_by_type(content_type, &[GENERAL_TOPIC.to_string()], CANDIDATE_LIMIT)
                .await?;
        }

        if candidates.is_empty() {
            debug!("No {} content available, using fallback reply", content_type);
            return Ok(SelectedResponse::fallback());
        }

        let index = self.with_rng(|rng| rng.gen_range(0..candidates.len()))?;
        let item = candidates.swap_remove(index);
        debug!("Selected {} content {} for topic '{}'", content_type, item.id, primary_topic);

        Ok(SelectedResponse::from_item(item))
    }
}
