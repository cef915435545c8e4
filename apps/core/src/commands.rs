//! Console commands: parsing of input lines and their execution against the local database.

use crate::chat::{BotResponse, ChatService};
use crate::database;
use crate::error::AppError;
use crate::models::{
    ChatSession, ContentDetails, ContentFilter, ContentItem, ContentType, Difficulty, FavoriteWithContent, Mood,
    MoodEntry, MoodInput, SessionFeedback, SessionKey, User, UserPreferences,
};
use crate::store::SqliteStore;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub const HELP_TEXT: &str = "\
Type anything to chat. Commands:
  /mood <mood> [note]         record a mood (very_bad, bad, neutral, good, very_good)
  /moods                      show your mood history
  /feedback <yes|no> [text]   rate the current session
  /history                    list your recent sessions
  /fav <content_id> [notes]   save a piece of content
  /favs                       list saved content
  /unfav <favorite_id>        remove saved content
  /note <favorite_id> [text]  change the notes on a favorite (no text clears them)
  /content <type> [tag|level] browse quotes, exercises, techniques or resources
  /resources                  list emergency resources
  /prefs [key=value ...]      show or change preferences
                              (quotes, exercises, techniques, notifications = on|off; theme = <name>)
  /new                        start a new session
  /help                       show this help
  /quit                       leave";

const HISTORY_LIMIT: i64 = 10;
const BROWSE_LIMIT: i64 = 20;
const EMERGENCY_LIST_LIMIT: usize = 10;

/// One `key=value` argument of `/prefs`.
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceChange {
    Quotes(bool),
    Exercises(bool),
    Techniques(bool),
    Notifications(bool),
    Theme(String),
}

impl PreferenceChange {
    fn apply(&self, preferences: &mut UserPreferences) {
        let content = &mut preferences.content_preferences;
        match self {
            PreferenceChange::Quotes(on) => content.quotes = *on,
            PreferenceChange::Exercises(on) => content.exercises = *on,
            PreferenceChange::Techniques(on) => content.techniques = *on,
            PreferenceChange::Notifications(on) => preferences.notifications_enabled = *on,
            PreferenceChange::Theme(theme) => preferences.theme = theme.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Chat(String),
    Mood { mood: Mood, note: String },
    Moods,
    Feedback { helpful: bool, comments: String },
    History,
    Favorite { content_id: i64, notes: Option<String> },
    Favorites,
    Unfavorite { favorite_id: i64 },
    Note { favorite_id: i64, notes: Option<String> },
    Browse {
        content_type: ContentType,
        tag: Option<String>,
        difficulty: Option<Difficulty>,
    },
    Resources,
    /// No changes means "show the current preferences".
    Preferences(Vec<PreferenceChange>),
    NewSession,
    Help,
    Quit,
}

fn parse_id(value: &str, what: &str) -> Result<i64, AppError> {
    value
        .parse::<i64>()
        .map_err(|_| AppError::Validation(format!("Invalid {}: '{}'", what, value)))
}

fn parse_yes_no(value: &str) -> Result<bool, AppError> {
    match value.to_lowercase().as_str() {
        "yes" | "y" | "true" | "helpful" => Ok(true),
        "no" | "n" | "false" | "unhelpful" => Ok(false),
        other => Err(AppError::Validation(format!("Expected yes or no, got '{}'", other))),
    }
}

fn parse_on_off(value: &str) -> Result<bool, AppError> {
    match value.to_lowercase().as_str() {
        "on" | "yes" | "true" => Ok(true),
        "off" | "no" | "false" => Ok(false),
        other => Err(AppError::Validation(format!("Expected on or off, got '{}'", other))),
    }
}

fn parse_preference(arg: &str) -> Result<PreferenceChange, AppError> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| AppError::Validation(format!("Expected key=value, got '{}'", arg)))?;
    let change = match key.to_lowercase().as_str() {
        "quotes" => PreferenceChange::Quotes(parse_on_off(value)?),
        "exercises" => PreferenceChange::Exercises(parse_on_off(value)?),
        "techniques" => PreferenceChange::Techniques(parse_on_off(value)?),
        "notifications" => PreferenceChange::Notifications(parse_on_off(value)?),
        "theme" if !value.is_empty() => PreferenceChange::Theme(value.to_lowercase()),
        "theme" => return Err(AppError::Validation("Theme cannot be empty".to_string())),
        other => return Err(AppError::Validation(format!("Unknown preference '{}'", other))),
    };
    Ok(change)
}

/// Accepts singular or plural type names ("exercise", "exercises").
fn parse_content_type(value: &str) -> Result<ContentType, AppError> {
    let lower = value.to_lowercase();
    lower.strip_suffix('s').unwrap_or(lower.as_str()).parse()
}

/// Parses one input line. Blank lines yield `None`; anything not starting with `/` is
/// chat and is passed on exactly as typed.
pub fn parse_command(line: &str) -> Result<Option<Command>, AppError> {
    let raw = line;
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if !line.starts_with('/') {
        return Ok(Some(Command::Chat(raw.to_string())));
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let (first, tail) = match rest.split_once(char::is_whitespace) {
        Some((first, tail)) => (first, tail.trim()),
        None => (rest, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "/mood" => {
            if first.is_empty() {
                return Err(AppError::Validation("Usage: /mood <mood> [note]".to_string()));
            }
            Command::Mood {
                mood: first.parse()?,
                note: tail.to_string(),
            }
        }
        "/moods" => Command::Moods,
        "/feedback" => {
            if first.is_empty() {
                return Err(AppError::Validation("Usage: /feedback <yes|no> [comments]".to_string()));
            }
            Command::Feedback {
                helpful: parse_yes_no(first)?,
                comments: tail.to_string(),
            }
        }
        "/history" => Command::History,
        "/fav" => {
            if first.is_empty() {
                return Err(AppError::Validation("Usage: /fav <content_id> [notes]".to_string()));
            }
            Command::Favorite {
                content_id: parse_id(first, "content id")?,
                notes: (!tail.is_empty()).then(|| tail.to_string()),
            }
        }
        "/favs" => Command::Favorites,
        "/unfav" => Command::Unfavorite {
            favorite_id: parse_id(first, "favorite id")?,
        },
        "/note" => {
            if first.is_empty() {
                return Err(AppError::Validation("Usage: /note <favorite_id> [text]".to_string()));
            }
            Command::Note {
                favorite_id: parse_id(first, "favorite id")?,
                notes: (!tail.is_empty()).then(|| tail.to_string()),
            }
        }
        "/content" => {
            if first.is_empty() {
                return Err(AppError::Validation("Usage: /content <type> [tag|difficulty]".to_string()));
            }
            let content_type = parse_content_type(first)?;
            let (tag, difficulty) = if tail.is_empty() {
                (None, None)
            } else if let Ok(difficulty) = tail.parse::<Difficulty>() {
                (None, Some(difficulty))
            } else {
                (Some(tail.to_lowercase()), None)
            };
            Command::Browse {
                content_type,
                tag,
                difficulty,
            }
        }
        "/resources" => Command::Resources,
        "/prefs" => Command::Preferences(
            rest.split_whitespace()
                .map(parse_preference)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        "/new" => Command::NewSession,
        "/help" | "/?" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => {
            return Err(AppError::Validation(format!(
                "Unknown command '{}', type /help for the list",
                other
            )))
        }
    };
    Ok(Some(command))
}

/// What the front end should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Reply(String),
    Quit,
}

fn new_session_key(user_id: i64) -> SessionKey {
    SessionKey::new(user_id, Uuid::new_v4().to_string())
}

fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

pub fn render_bot_response(response: &BotResponse) -> String {
    let mut out = response.content.clone();
    for resource in &response.resources {
        out.push_str(&format!("\n  - {}: {} ({})", resource.title, resource.description, resource.url));
    }
    if let Some(id) = response.content_reference.content_id {
        if !response.flagged_as_crisis {
            out.push_str(&format!("\n[content #{}]", id));
        }
    }
    out
}

fn render_moods(entries: &[MoodEntry]) -> String {
    if entries.is_empty() {
        return "No moods recorded yet.".to_string();
    }
    entries
        .iter()
        .map(|entry| {
            let mood = entry.mood.as_str();
            if entry.note.is_empty() {
                format!("{}  {}", format_timestamp(entry.recorded_at), mood)
            } else {
                format!("{}  {}  {}", format_timestamp(entry.recorded_at), mood, entry.note)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_sessions(sessions: &[ChatSession], current: &SessionKey) -> String {
    if sessions.is_empty() {
        return "No sessions yet.".to_string();
    }
    sessions
        .iter()
        .map(|s| {
            let marker = if s.session_key == current.session_key { "*" } else { " " };
            format!(
                "{} {}  {}  mood: {}  themes: {}",
                marker,
                format_timestamp(s.updated_at),
                s.session_key,
                s.emotional_state,
                s.detected_themes.0.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_favorites(favorites: &[FavoriteWithContent]) -> String {
    if favorites.is_empty() {
        return "No favorites yet.".to_string();
    }
    favorites
        .iter()
        .map(|f| {
            let mut line = format!(
                "#{} [{} #{}] {}",
                f.favorite.id,
                f.content.content_type(),
                f.content.id,
                f.content.details.title()
            );
            if let Some(notes) = &f.favorite.notes {
                line.push_str(&format!(" ({})", notes));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_content(items: &[ContentItem]) -> String {
    if items.is_empty() {
        return "Nothing found.".to_string();
    }
    items
        .iter()
        .map(|item| match &item.details {
            ContentDetails::Quote { text, author, .. } => format!("#{} \"{}\" - {}", item.id, text, author),
            ContentDetails::Exercise {
                title,
                duration,
                difficulty,
                ..
            } => format!("#{} {} ({}, {} min)", item.id, title, difficulty.as_str(), duration),
            ContentDetails::Technique { title, description, .. } => format!("#{} {}: {}", item.id, title, description),
            ContentDetails::Resource { title, url, .. } => format!("#{} {} ({})", item.id, title, url),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_resources(items: &[ContentItem]) -> String {
    if items.is_empty() {
        return "No emergency resources are configured.".to_string();
    }
    items
        .iter()
        .map(|item| match &item.details {
            ContentDetails::Resource {
                title,
                description,
                url,
                ..
            } => format!("#{} {}: {} ({})", item.id, title, description, url),
            other => format!("#{} {}", item.id, other.title()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_preferences(preferences: &UserPreferences) -> String {
    let on_off = |on: bool| if on { "on" } else { "off" };
    let content = &preferences.content_preferences;
    format!(
        "quotes={} exercises={} techniques={}\nnotifications={}\ntheme={}",
        on_off(content.quotes),
        on_off(content.exercises),
        on_off(content.techniques),
        on_off(preferences.notifications_enabled),
        preferences.theme
    )
}

/// One local user talking to the chatbot, with a current session.
pub struct Console<R> {
    store: Arc<SqliteStore>,
    service: ChatService<SqliteStore, SqliteStore, R>,
    user: User,
    session: SessionKey,
}

impl<R: Rng + Send> Console<R> {
    pub fn new(store: SqliteStore, user: User, rng: R) -> Self {
        let store = Arc::new(store);
        let service = ChatService::new(store.clone(), store.clone(), rng);
        let session = new_session_key(user.id);
        Self {
            store,
            service,
            user,
            session,
        }
    }

    pub fn session(&self) -> &SessionKey {
        &self.session
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub async fn execute(&mut self, command: Command) -> Result<Outcome, AppError> {
        let pool = self.store.pool();
        let user_id = self.user.id;

        let reply = match command {
            Command::Chat(text) => {
                let preferences = self.user.preferences.0.content_preferences;
                let response = self.service.process_message(&self.session, &text, &preferences).await?;
                render_bot_response(&response)
            }
            Command::Mood { mood, note } => {
                let history = database::add_mood_entry(pool, user_id, &MoodInput { mood, note }).await?;
                format!("Mood recorded. You have {} entries.", history.len())
            }
            Command::Moods => render_moods(&database::mood_history(pool, user_id).await?),
            Command::Feedback { helpful, comments } => {
                let feedback = SessionFeedback { helpful, comments };
                match database::add_session_feedback(pool, &self.session, &feedback).await {
                    Ok(_) => "Thanks for the feedback.".to_string(),
                    Err(AppError::NotFound(_)) => "Say something first, then rate the session.".to_string(),
                    Err(e) => return Err(e),
                }
            }
            Command::History => {
                let sessions = database::list_sessions(pool, user_id, HISTORY_LIMIT, 0).await?;
                render_sessions(&sessions, &self.session)
            }
            Command::Favorite { content_id, notes } => {
                let favorite = database::add_favorite(pool, user_id, content_id, notes).await?;
                format!("Saved as favorite #{}.", favorite.id)
            }
            Command::Favorites => render_favorites(&database::list_favorites(pool, user_id).await?),
            Command::Unfavorite { favorite_id } => {
                database::remove_favorite(pool, user_id, favorite_id).await?;
                format!("Removed favorite #{}.", favorite_id)
            }
            Command::Note { favorite_id, notes } => {
                database::update_favorite_notes(pool, user_id, favorite_id, notes).await?;
                format!("Updated notes on favorite #{}.", favorite_id)
            }
            Command::Browse {
                content_type,
                tag,
                difficulty,
            } => {
                let filter = ContentFilter {
                    content_type: Some(content_type),
                    tags: tag.into_iter().collect(),
                    difficulty,
                    limit: BROWSE_LIMIT,
                    ..ContentFilter::default()
                };
                render_content(&database::list_content(pool, &filter).await?)
            }
            Command::Resources => {
                render_resources(&database::find_active_emergency_resources(pool, EMERGENCY_LIST_LIMIT).await?)
            }
            Command::Preferences(changes) => {
                if !changes.is_empty() {
                    let mut preferences = self.user.preferences.0.clone();
                    for change in &changes {
                        change.apply(&mut preferences);
                    }
                    self.user = database::update_preferences(pool, user_id, &preferences).await?;
                    info!(user_id, "Updated preferences");
                }
                render_preferences(&self.user.preferences.0)
            }
            Command::NewSession => {
                self.session = new_session_key(user_id);
                info!(session = %self.session.session_key, "Started new session");
                "Started a new session.".to_string()
            }
            Command::Help => HELP_TEXT.to_string(),
            Command::Quit => return Ok(Outcome::Quit),
        };

        Ok(Outcome::Reply(reply))
    }
}
