//! Message analyzer: keyword-based emotion/topic classification and crisis detection.
//!
//! Matching is plain substring containment on the lowercased message. There is no
//! tokenization or word-boundary check, so "cutting the grass" is a crisis hit and
//! "diet" contains "die". Callers rely on exactly this behaviour.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::keywords::{KeywordTable, CRISIS_KEYWORDS, EMOTION_KEYWORDS, GENERAL_TOPIC, TOPIC_KEYWORDS};

/// Reported when no emotion category matched.
pub const UNDEFINED_EMOTION: &str = "undefined";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace run"));

/// Result of analyzing one chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Matched emotion categories, in table order.
    pub emotions: Vec<String>,
    /// Matched topic categories, in table order. Never empty.
    pub topics: Vec<String>,
    /// First matched emotion, or `"undefined"`.
    pub primary_emotion: String,
    /// Length of the message in characters.
    pub message_length: usize,
    /// Pieces left after splitting on whitespace runs. Empty pieces count, so `""` has 1.
    pub word_count: usize,
}

impl AnalysisResult {
    /// First topic, falling back to `"general"`.
    pub fn primary_topic(&self) -> &str {
        self.topics.first().map(String::as_str).unwrap_or(GENERAL_TOPIC)
    }

    pub fn has_emotion(&self) -> bool {
        !self.emotions.is_empty()
    }
}

/// Keyword classifier over fixed emotion, topic and crisis tables.
#[derive(Debug, Clone, Copy)]
pub struct MessageAnalyzer {
    emotions: KeywordTable,
    topics: KeywordTable,
    crisis: &'static [&'static str],
}

impl Default for MessageAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageAnalyzer {
    /// Analyzer over the built-in tables.
    pub fn new() -> Self {
        Self::with_tables(EMOTION_KEYWORDS, TOPIC_KEYWORDS, CRISIS_KEYWORDS)
    }

    pub fn with_tables(
        emotions: KeywordTable,
        topics: KeywordTable,
        crisis: &'static [&'static str],
    ) -> Self {
        Self {
            emotions,
            topics,
            crisis,
        }
    }

    /// Classifies a message. Pure and infallible.
    pub fn analyze(&self, message: &str) -> AnalysisResult {
        let lower = message.to_lowercase();

        let emotions: Vec<String> = self
            .emotions
            .matching_categories(&lower)
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut topics: Vec<String> = self
            .topics
            .matching_categories(&lower)
            .into_iter()
            .map(str::to_string)
            .collect();
        if topics.is_empty() {
            topics.push(GENERAL_TOPIC.to_string());
        }

        let primary_emotion = emotions
            .first()
            .cloned()
            .unwrap_or_else(|| UNDEFINED_EMOTION.to_string());

        AnalysisResult {
            emotions,
            topics,
            primary_emotion,
            message_length: message.chars().count(),
            word_count: WHITESPACE_RUN.split(message).count(),
        }
    }

    /// True iff any crisis phrase occurs in the lowercased message.
    pub fn detect_crisis(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        self.crisis.iter().any(|phrase| lower.contains(*phrase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_boundary() {
        let result = MessageAnalyzer::new().analyze("");

        assert!(result.emotions.is_empty());
        assert_eq!(result.topics, vec!["general".to_string()]);
        assert_eq!(result.primary_emotion, "undefined");
        assert_eq!(result.message_length, 0);
        assert_eq!(result.word_count, 1);
    }

    #[test]
    fn test_word_count_counts_empty_edges() {
        let analyzer = MessageAnalyzer::new();
        assert_eq!(analyzer.analyze("one two  three").word_count, 3);
        assert_eq!(analyzer.analyze(" padded ").word_count, 3);
    }

    #[test]
    fn test_primary_topic() {
        let analyzer = MessageAnalyzer::new();
        assert_eq!(analyzer.analyze("hello there").primary_topic(), "general");
        assert_eq!(analyzer.analyze("I can't get to sleep").primary_topic(), "sleep");
    }

    #[test]
    fn test_crisis_is_case_insensitive() {
        let analyzer = MessageAnalyzer::new();
        assert!(analyzer.detect_crisis("Sometimes I think about SUICIDE"));
        assert!(!analyzer.detect_crisis("I had a good day"));
    }
}
