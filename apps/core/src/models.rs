use crate::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Kind of a stored wellness content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ContentType {
    Quote,
    Exercise,
    Technique,
    Resource,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Quote => "quote",
            ContentType::Exercise => "exercise",
            ContentType::Technique => "technique",
            ContentType::Resource => "resource",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quote" => Ok(ContentType::Quote),
            "exercise" => Ok(ContentType::Exercise),
            "technique" => Ok(ContentType::Technique),
            "resource" => Ok(ContentType::Resource),
            other => Err(AppError::Validation(format!("Unknown content type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(AppError::Validation(format!("Unknown difficulty: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Article,
    Video,
    Book,
    Podcast,
    App,
    Hotline,
    Organization,
    Other,
}

fn default_author() -> String {
    "Unknown".to_string()
}

fn default_duration() -> u32 {
    5
}

/// Type-specific fields of a content item. The tag doubles as the content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "content_type", rename_all = "lowercase")]
pub enum ContentDetails {
    Quote {
        text: String,
        #[serde(default = "default_author")]
        author: String,
        #[serde(default)]
        source: Option<String>,
    },
    Exercise {
        title: String,
        description: String,
        #[serde(default)]
        steps: Vec<String>,
        /// Duration in minutes.
        #[serde(default = "default_duration")]
        duration: u32,
        #[serde(default)]
        difficulty: Difficulty,
    },
    Technique {
        title: String,
        description: String,
        instructions: String,
        #[serde(default)]
        benefits: Vec<String>,
        #[serde(default)]
        contraindications: Vec<String>,
    },
    Resource {
        title: String,
        description: String,
        url: String,
        resource_type: ResourceType,
        #[serde(default)]
        is_emergency: bool,
    },
}

impl ContentDetails {
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentDetails::Quote { .. } => ContentType::Quote,
            ContentDetails::Exercise { .. } => ContentType::Exercise,
            ContentDetails::Technique { .. } => ContentType::Technique,
            ContentDetails::Resource { .. } => ContentType::Resource,
        }
    }

    /// Display title; quotes use their text.
    pub fn title(&self) -> &str {
        match self {
            ContentDetails::Quote { text, .. } => text,
            ContentDetails::Exercise { title, .. }
            | ContentDetails::Technique { title, .. }
            | ContentDetails::Resource { title, .. } => title,
        }
    }

    pub fn is_emergency(&self) -> bool {
        matches!(self, ContentDetails::Resource { is_emergency: true, .. })
    }

    /// Checks the required fields of each content type.
    pub fn check(&self) -> Result<(), AppError> {
        use validator::ValidateUrl;

        fn required(field: &str, value: &str) -> Result<(), AppError> {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
            Ok(())
        }

        match self {
            ContentDetails::Quote { text, .. } => required("text", text),
            ContentDetails::Exercise { title, description, steps, .. } => {
                required("title", title)?;
                required("description", description)?;
                if steps.is_empty() {
                    return Err(AppError::Validation("steps are required".to_string()));
                }
                Ok(())
            }
            ContentDetails::Technique { title, description, instructions, .. } => {
                required("title", title)?;
                required("description", description)?;
                required("instructions", instructions)
            }
            ContentDetails::Resource { title, description, url, .. } => {
                required("title", title)?;
                required("description", description)?;
                if !url.validate_url() {
                    return Err(AppError::Validation(format!("Invalid resource url: {}", url)));
                }
                Ok(())
            }
        }
    }
}

/// A stored, taggable piece of wellness content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    pub tags: Vec<String>,
    pub active: bool,
    pub created_by: Option<i64>,
    /// Unix timestamp (milliseconds).
    pub created_at: i64,
    /// Unix timestamp (milliseconds).
    pub updated_at: i64,
    #[serde(flatten)]
    pub details: ContentDetails,
}

impl ContentItem {
    pub fn content_type(&self) -> ContentType {
        self.details.content_type()
    }
}

/// Input for creating a content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContent {
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub details: ContentDetails,
}

/// Partial update of a content item. Tags, when present, replace the existing set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentUpdate {
    pub tags: Option<Vec<String>>,
    pub details: Option<ContentDetails>,
    pub active: Option<bool>,
}

/// Listing filter for the content library.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    pub content_type: Option<ContentType>,
    /// Matches items carrying any of these tags.
    pub tags: Vec<String>,
    pub difficulty: Option<Difficulty>,
    pub include_inactive: bool,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self {
            content_type: None,
            tags: Vec::new(),
            difficulty: None,
            include_inactive: false,
            limit: 10,
            offset: 0,
        }
    }
}

// --- Users ---

/// Which content types the chatbot may answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPreferences {
    pub quotes: bool,
    pub exercises: bool,
    pub techniques: bool,
}

impl Default for ContentPreferences {
    fn default() -> Self {
        Self {
            quotes: true,
            exercises: true,
            techniques: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub content_preferences: ContentPreferences,
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            notifications_enabled: true,
            content_preferences: ContentPreferences::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub preferences: Json<UserPreferences>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

// --- Chat ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// What a chat message refers to: a content type, or `general` for the generic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ReferenceKind {
    Quote,
    Exercise,
    Technique,
    Resource,
    General,
}

impl From<ContentType> for ReferenceKind {
    fn from(content_type: ContentType) -> Self {
        match content_type {
            ContentType::Quote => ReferenceKind::Quote,
            ContentType::Exercise => ReferenceKind::Exercise,
            ContentType::Technique => ReferenceKind::Technique,
            ContentType::Resource => ReferenceKind::Resource,
        }
    }
}

/// Identifies a chat session: one log per (user, session key) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub user_id: i64,
    pub session_key: String,
}

impl SessionKey {
    pub fn new(user_id: i64, session_key: impl Into<String>) -> Self {
        Self {
            user_id,
            session_key: session_key.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    pub id: i64,
    pub user_id: i64,
    pub session_key: String,
    /// Ordered union of every topic detected in the session.
    pub detected_themes: Json<Vec<String>>,
    /// Primary emotion of the most recent user message.
    pub emotional_state: String,
    pub feedback_helpful: Option<bool>,
    pub feedback_comments: Option<String>,
    pub feedback_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A message ready to be appended to a session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewChatMessage {
    pub sender: Sender,
    pub content: String,
    pub content_type: ReferenceKind,
    pub content_id: Option<i64>,
    pub detected_emotions: Vec<String>,
    pub flagged_as_crisis: bool,
    pub additional_data: serde_json::Value,
}

impl NewChatMessage {
    pub fn from_user(content: &str, detected_emotions: Vec<String>, flagged_as_crisis: bool) -> Self {
        Self {
            sender: Sender::User,
            content: content.to_string(),
            content_type: ReferenceKind::General,
            content_id: None,
            detected_emotions,
            flagged_as_crisis,
            additional_data: serde_json::Value::Object(Default::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub chat_session_id: i64,
    pub sender: Sender,
    pub content: String,
    pub content_type: ReferenceKind,
    pub content_id: Option<i64>,
    pub detected_emotions: Json<Vec<String>>,
    pub flagged_as_crisis: bool,
    pub additional_data: Json<serde_json::Value>,
    pub created_at: i64,
}

/// A session together with its ordered messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSessionWithMessages {
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionFeedback {
    pub helpful: bool,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub comments: String,
}

// --- Mood tracking ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Mood {
    VeryBad,
    Bad,
    Neutral,
    Good,
    VeryGood,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::VeryBad => "very_bad",
            Mood::Bad => "bad",
            Mood::Neutral => "neutral",
            Mood::Good => "good",
            Mood::VeryGood => "very_good",
        }
    }
}

impl FromStr for Mood {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(&['-', ' '][..], "_").as_str() {
            "very_bad" => Ok(Mood::VeryBad),
            "bad" => Ok(Mood::Bad),
            "neutral" => Ok(Mood::Neutral),
            "good" => Ok(Mood::Good),
            "very_good" => Ok(Mood::VeryGood),
            other => Err(AppError::Validation(format!(
                "Unknown mood '{}': expected very_bad, bad, neutral, good or very_good",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MoodInput {
    pub mood: Mood,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: i64,
    pub user_id: i64,
    pub mood: Mood,
    pub note: String,
    pub recorded_at: i64,
}

// --- Favorites ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub content_id: i64,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteWithContent {
    pub favorite: Favorite,
    pub content: ContentItem,
}
