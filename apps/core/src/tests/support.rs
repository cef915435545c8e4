//! Shared test doubles for the store seams.

use crate::error::AppError;
use crate::models::{
    ChatMessage, ChatSession, ContentDetails, ContentItem, ContentType, Difficulty, NewChatMessage, ResourceType,
    SessionKey,
};
use crate::store::{ContentStore, SessionLog};
use async_trait::async_trait;
use sqlx::types::Json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn item(id: i64, tags: &[&str], details: ContentDetails) -> ContentItem {
    ContentItem {
        id,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        active: true,
        created_by: None,
        created_at: 0,
        updated_at: 0,
        details,
    }
}

pub fn quote(id: i64, tags: &[&str]) -> ContentItem {
    item(
        id,
        tags,
        ContentDetails::Quote {
            text: format!("Quote number {}", id),
            author: "Anonymous".to_string(),
            source: None,
        },
    )
}

pub fn exercise(id: i64, tags: &[&str]) -> ContentItem {
    item(
        id,
        tags,
        ContentDetails::Exercise {
            title: format!("Exercise {}", id),
            description: "Breathe slowly.".to_string(),
            steps: vec!["Inhale".to_string(), "Exhale".to_string()],
            duration: 3,
            difficulty: Difficulty::Beginner,
        },
    )
}

pub fn technique(id: i64, tags: &[&str]) -> ContentItem {
    item(
        id,
        tags,
        ContentDetails::Technique {
            title: format!("Technique {}", id),
            description: "Notice your thoughts.".to_string(),
            instructions: "Sit and notice.".to_string(),
            benefits: vec!["Calm".to_string()],
            contraindications: vec![],
        },
    )
}

pub fn resource(id: i64, is_emergency: bool) -> ContentItem {
    item(
        id,
        &["crisis"],
        ContentDetails::Resource {
            title: format!("Hotline {}", id),
            description: "Free 24/7 support.".to_string(),
            url: format!("https://hotline{}.example.org", id),
            resource_type: ResourceType::Hotline,
            is_emergency,
        },
    )
}

/// In-memory content library that records every query it receives.
#[derive(Default)]
pub struct MockContentStore {
    items: Vec<ContentItem>,
    /// When non-empty, `find_active_by_type` pops its answers from here instead of filtering.
    scripted: Mutex<VecDeque<Vec<ContentItem>>>,
    fail: bool,
    pub queries: Mutex<Vec<(ContentType, Vec<String>)>>,
    pub emergency_calls: AtomicUsize,
}

impl MockContentStore {
    pub fn with_items(items: Vec<ContentItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn scripted(answers: Vec<Vec<ContentItem>>) -> Self {
        Self {
            scripted: Mutex::new(answers.into()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn find_active_by_type(
        &self,
        content_type: ContentType,
        tags: &[String],
        limit: usize,
    ) -> Result<Vec<ContentItem>, AppError> {
        self.queries.lock().unwrap().push((content_type, tags.to_vec()));
        if self.fail {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        if let Some(answer) = self.scripted.lock().unwrap().pop_front() {
            return Ok(answer);
        }
        Ok(self
            .items
            .iter()
            .filter(|i| i.active && i.content_type() == content_type)
            .filter(|i| i.tags.iter().any(|t| tags.contains(t)))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_active_emergency_resources(&self, limit: usize) -> Result<Vec<ContentItem>, AppError> {
        self.emergency_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self
            .items
            .iter()
            .filter(|i| i.active && i.details.is_emergency())
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Session log kept in memory.
#[derive(Default)]
pub struct MockSessionLog {
    pub opened: AtomicUsize,
    pub messages: Mutex<Vec<NewChatMessage>>,
    pub analyses: Mutex<Vec<(Vec<String>, String)>>,
}

impl MockSessionLog {
    pub fn messages(&self) -> Vec<NewChatMessage> {
        self.messages.lock().unwrap().clone()
    }
}

fn session(key: &SessionKey) -> ChatSession {
    ChatSession {
        id: 1,
        user_id: key.user_id,
        session_key: key.session_key.clone(),
        detected_themes: Json(vec![]),
        emotional_state: "undefined".to_string(),
        feedback_helpful: None,
        feedback_comments: None,
        feedback_at: None,
        created_at: 0,
        updated_at: 0,
    }
}

#[async_trait]
impl SessionLog for MockSessionLog {
    async fn open_session(&self, key: &SessionKey) -> Result<ChatSession, AppError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(session(key))
    }

    async fn append_message(&self, _key: &SessionKey, message: &NewChatMessage) -> Result<ChatMessage, AppError> {
        let mut messages = self.messages.lock().unwrap();
        messages.push(message.clone());
        Ok(ChatMessage {
            id: messages.len() as i64,
            chat_session_id: 1,
            sender: message.sender,
            content: message.content.clone(),
            content_type: message.content_type,
            content_id: message.content_id,
            detected_emotions: Json(message.detected_emotions.clone()),
            flagged_as_crisis: message.flagged_as_crisis,
            additional_data: Json(message.additional_data.clone()),
            created_at: 0,
        })
    }

    async fn record_analysis(&self, _key: &SessionKey, topics: &[String], emotional_state: &str) -> Result<(), AppError> {
        self.analyses
            .lock()
            .unwrap()
            .push((topics.to_vec(), emotional_state.to_string()));
        Ok(())
    }
}
