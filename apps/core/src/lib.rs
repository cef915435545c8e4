//! Wellness chatbot core: keyword analysis, response selection, crisis handling and
//! the SQLite-backed content library and chat log.

pub mod brain;
pub mod chat;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod fs_manager;
pub mod models;
pub mod seed;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod tests;
