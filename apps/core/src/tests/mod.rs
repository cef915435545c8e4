//! Test Module
//!
//! Cross-module test suite for the wellness core.
//!
//! ## Test Categories
//! - `brain_tests`: Emotion/topic classification and crisis detection
//! - `selector_tests`: Weighted content selection, retries and fallback
//! - `chat_service_tests`: Message orchestration against mock stores
//! - `database_tests`: SQLite CRUD, seeding and end-to-end chat runs

mod support;

pub mod selector_tests;
