//! Conversation sessions
//!
//! A session holds the in-memory history for one conversation and flushes
//! it to a [`HistoryStore`](crate::history::HistoryStore) after every
//! exchange when persistence is enabled.

pub mod conversation;

pub use conversation::ConversationSession;
