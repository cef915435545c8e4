//! # Brain Module
//!
//! Fast, rule-based analysis of incoming chat messages.
//!
//! ## Components
//! - `keywords`: static emotion, topic and crisis keyword tables
//! - `analyzer`: substring classifier and crisis detector over those tables

pub mod analyzer;
pub mod keywords;

pub use analyzer::{AnalysisResult, MessageAnalyzer, UNDEFINED_EMOTION};
pub use keywords::{KeywordTable, CRISIS_KEYWORDS, EMOTION_KEYWORDS, GENERAL_TOPIC, TOPIC_KEYWORDS};
