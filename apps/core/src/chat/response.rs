//! Bot replies and their rendering from stored content.

use crate::error::AppError;
use crate::models::{ContentDetails, ContentItem, Difficulty, NewChatMessage, ReferenceKind, ResourceType, Sender};
use serde::{Deserialize, Serialize};

/// Reply used when no content matched at all.
pub const FALLBACK_RESPONSE: &str = "I hear you. Sometimes it helps to take a deep breath and focus on the present moment. How are you feeling right now?";

/// Reply sent on the crisis path, ahead of the emergency resources.
pub const CRISIS_RESPONSE: &str = "I'm concerned about what you're sharing. If you're having thoughts of harming yourself, please reach out to a crisis helpline immediately. Would you like me to provide some resources that might help?";

/// Renders the reply text for a selected item.
pub fn render_response_text(details: &ContentDetails) -> String {
    match details {
        ContentDetails::Quote { text, author, .. } => {
            if author.trim().is_empty() {
                format!("\"{}\"", text)
            } else {
                format!("\"{}\" - {}", text, author)
            }
        }
        ContentDetails::Exercise { title, description, .. } => format!(
            "Here's a mindfulness exercise that might help: \"{}\"\n\n{}\n\nWould you like me to guide you through this exercise step by step?",
            title, description
        ),
        ContentDetails::Technique { title, description, .. } => format!(
            "I'd like to suggest a technique called \"{}\"\n\n{}\n\nWould you like to learn more about how to practice this?",
            title, description
        ),
        // The selector never draws resources; the crisis path lists them itself.
        ContentDetails::Resource { title, description, url, .. } => format!("{}\n\n{}\n\n{}", title, description, url),
    }
}

/// Which stored item a reply points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentReference {
    pub content_type: ReferenceKind,
    pub content_id: Option<i64>,
}

/// Type-specific extras attached to a normal reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseDetails {
    Quote {
        author: String,
        source: Option<String>,
    },
    Exercise {
        title: String,
        steps: Vec<String>,
        duration: u32,
        difficulty: Difficulty,
    },
    Technique {
        title: String,
        instructions: String,
        benefits: Vec<String>,
    },
}

impl ResponseDetails {
    pub fn from_details(details: &ContentDetails) -> Option<Self> {
        match details {
            ContentDetails::Quote { author, source, .. } => Some(ResponseDetails::Quote {
                author: author.clone(),
                source: source.clone(),
            }),
            ContentDetails::Exercise { title, steps, duration, difficulty, .. } => Some(ResponseDetails::Exercise {
                title: title.clone(),
                steps: steps.clone(),
                duration: *duration,
                difficulty: *difficulty,
            }),
            ContentDetails::Technique { title, instructions, benefits, .. } => Some(ResponseDetails::Technique {
                title: title.clone(),
                instructions: instructions.clone(),
                benefits: benefits.clone(),
            }),
            ContentDetails::Resource { .. } => None,
        }
    }
}

/// Emergency resource as shown to the user on the crisis path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub resource_type: ResourceType,
}

impl ResourceSummary {
    pub fn from_item(item: &ContentItem) -> Option<Self> {
        match &item.details {
            ContentDetails::Resource { title, description, url, resource_type, .. } => Some(Self {
                id: item.id,
                title: title.clone(),
                description: description.clone(),
                url: url.clone(),
                resource_type: *resource_type,
            }),
            _ => None,
        }
    }
}

/// Outcome of the response selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedResponse {
    pub content_type: ReferenceKind,
    /// `None` when the generic fallback was used.
    pub item: Option<ContentItem>,
    pub response_text: String,
}

impl SelectedResponse {
    pub fn from_item(item: ContentItem) -> Self {
        Self {
            content_type: item.content_type().into(),
            response_text: render_response_text(&item.details),
            item: Some(item),
        }
    }

    pub fn fallback() -> Self {
        Self {
            content_type: ReferenceKind::General,
            item: None,
            response_text: FALLBACK_RESPONSE.to_string(),
        }
    }
}

/// A bot reply, as returned to the caller and appended to the session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotResponse {
    pub sender: Sender,
    pub content: String,
    pub content_reference: ContentReference,
    pub flagged_as_crisis: bool,
    pub detected_emotions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ResponseDetails>,
}

impl BotResponse {
    pub fn from_selection(selection: SelectedResponse) -> Self {
        let details = selection
            .item
            .as_ref()
            .and_then(|item| ResponseDetails::from_details(&item.details));
        Self {
            sender: Sender::Bot,
            content: selection.response_text,
            content_reference: ContentReference {
                content_type: selection.content_type,
                content_id: selection.item.as_ref().map(|item| item.id),
            },
            flagged_as_crisis: false,
            detected_emotions: Vec::new(),
            resources: Vec::new(),
            details,
        }
    }

    pub fn crisis(resources: Vec<ResourceSummary>) -> Self {
        Self {
            sender: Sender::Bot,
            content: CRISIS_RESPONSE.to_string(),
            content_reference: ContentReference {
                content_type: ReferenceKind::Resource,
                content_id: resources.first().map(|r| r.id),
            },
            flagged_as_crisis: true,
            detected_emotions: Vec::new(),
            resources,
            details: None,
        }
    }

    /// Log entry for this reply; extras go into `additional_data`.
    pub fn to_message(&self) -> Result<NewChatMessage, AppError> {
        let mut additional = serde_json::Map::new();
        if let Some(details) = &self.details {
            additional.insert("details".to_string(), serde_json::to_value(details)?);
        }
        if !self.resources.is_empty() {
            additional.insert("resources".to_string(), serde_json::to_value(&self.resources)?);
        }

        Ok(NewChatMessage {
            sender: Sender::Bot,
            content: self.content.clone(),
            content_type: self.content_reference.content_type,
            content_id: self.content_reference.content_id,
            detected_emotions: self.detected_emotions.clone(),
            flagged_as_crisis: self.flagged_as_crisis,
            additional_data: serde_json::Value::Object(additional),
        })
    }
}
