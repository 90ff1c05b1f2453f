//! In-memory conversation backed by an optional history store

use crate::config::HistoryConfig;
use crate::history::{HistoryStore, Turn};
use chrono::{DateTime, Utc};
use tracing::debug;

/// The authoritative turn sequence for one running conversation
///
/// With a store attached, the session is hydrated from it on construction
/// and the full sequence is handed back to it after every exchange.
#[derive(Debug)]
pub struct ConversationSession {
    turns: Vec<Turn>,
    store: Option<HistoryStore>,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Create a session, loading prior turns when a store is given
    pub fn new(store: Option<HistoryStore>) -> Self {
        let turns = match &store {
            Some(store) => {
                let turns = store.load();
                debug!(
                    "Hydrated session with {} turns from {}",
                    turns.len(),
                    store.path().display()
                );
                turns
            }
            None => Vec::new(),
        };

        let now = Utc::now();
        Self {
            turns,
            store,
            started_at: now,
            updated_at: now,
        }
    }

    /// Create a session without persistence
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    /// Create a session from configuration; persistence only when enabled
    pub fn from_config(config: &HistoryConfig) -> crate::Result<Self> {
        let store = if config.enabled {
            Some(HistoryStore::from_config(config)?)
        } else {
            None
        };
        Ok(Self::new(store))
    }

    /// Append one completed exchange and persist the full history
    pub fn record_exchange(&mut self, user_text: impl Into<String>, bot_text: impl Into<String>) {
        self.turns.push(Turn::user(user_text));
        self.turns.push(Turn::bot(bot_text));
        self.updated_at = Utc::now();

        if let Some(store) = &self.store {
            store.save(&self.turns);
        }
    }

    /// Drop all turns, persisting the empty history when enabled
    pub fn clear(&mut self) {
        self.turns.clear();
        self.updated_at = Utc::now();

        if let Some(store) = &self.store {
            store.clear();
        }
    }

    /// Full history, oldest first
    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn persistence_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// When this session was created
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the last exchange was recorded or the session was cleared
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
