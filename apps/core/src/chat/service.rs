use crate::brain::MessageAnalyzer;
use crate::error::AppError;
use crate::models::{ContentPreferences, NewChatMessage, SessionKey};
use crate::store::{ContentStore, SessionLog};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::crisis::crisis_response;
use super::response::BotResponse;
use super::selector::ResponseSelector;

/// Entry point of the chat core.
///
/// Each call handles one message end to end: crisis check, analysis, reply
/// generation, then one write of the whole exchange to the session log. Nothing
/// is shared between calls except the stores and the random source.
pub struct ChatService<C, L, R> {
    analyzer: MessageAnalyzer,
    content: Arc<C>,
    log: Arc<L>,
    selector: ResponseSelector<R>,
}

impl<C, L, R> ChatService<C, L, R>
where
    C: ContentStore,
    L: SessionLog,
    R: Rng + Send,
{
    pub fn new(content: Arc<C>, log: Arc<L>, rng: R) -> Self {
        Self::with_analyzer(MessageAnalyzer::new(), content, log, rng)
    }

    pub fn with_analyzer(analyzer: MessageAnalyzer, content: Arc<C>, log: Arc<L>, rng: R) -> Self {
        Self {
            analyzer,
            content,
            log,
            selector: ResponseSelector::new(rng),
        }
    }

    pub fn analyzer(&self) -> &MessageAnalyzer {
        &self.analyzer
    }

    /// Processes one chat message and returns the bot reply.
    ///
    /// Empty messages are rejected before anything is stored. The exchange is
    /// only logged once the reply exists, so a failed request stores nothing.
    /// Store failures are returned as-is; nothing is retried.
    #[instrument(skip(self, key, message, preferences), fields(user_id = key.user_id, session = %key.session_key))]
    pub async fn process_message(
        &self,
        key: &SessionKey,
        message: &str,
        preferences: &ContentPreferences,
    ) -> Result<BotResponse, AppError> {
        if message.trim().is_empty() {
            return Err(AppError::Validation("Please provide a message".to_string()));
        }

        let is_crisis = self.analyzer.detect_crisis(message);
        let analysis = self.analyzer.analyze(message);

        let response = if is_crisis {
            warn!("Crisis language detected, answering with emergency resources");
            crisis_response(self.content.as_ref()).await?
        } else {
            let selection = self
                .selector
                .select_response(&analysis, preferences, self.content.as_ref())
                .await?;
            BotResponse::from_selection(selection)
        };

        let user_message = NewChatMessage::from_user(message, analysis.emotions.clone(), is_crisis);
        self.log
            .record_exchange(
                key,
                &user_message,
                &response.to_message()?,
                &analysis.topics,
                &analysis.primary_emotion,
            )
            .await?;

        info!(
            emotion = %analysis.primary_emotion,
            topic = %analysis.primary_topic(),
            crisis = is_crisis,
            "Replied with {:?} content",
            response.content_reference.content_type
        );

        Ok(response)
    }
}
