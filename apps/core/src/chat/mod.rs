//! # Chat Module
//!
//! Turns an incoming message into a bot reply.
//!
//! ## Components
//! - `selector`: weighted random content selection for normal messages
//! - `crisis`: emergency resource reply, bypassing the selector
//! - `response`: reply types and text rendering
//! - `service`: per-message orchestration over the content store and session log

pub mod crisis;
pub mod response;
pub mod selector;
pub mod service;

pub use crisis::{crisis_response, EMERGENCY_RESOURCE_LIMIT};
pub use response::{
    BotResponse, ContentReference, ResourceSummary, ResponseDetails, SelectedResponse, CRISIS_RESPONSE,
    FALLBACK_RESPONSE,
};
pub use selector::{candidate_types, weighted_content_type, ResponseSelector, CANDIDATE_LIMIT};
pub use service::ChatService;
