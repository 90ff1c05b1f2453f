//! Core types and storage for vibe-chat
//!
//! This crate provides the conversation data model, the durable history
//! store, the in-memory conversation session, configuration loading and
//! logging setup shared by the other vibe-chat crates.

pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod session;
pub mod utils;

pub use error::{Error, Result};
pub use history::{HistoryStore, Speaker, Turn};
pub use session::ConversationSession;
