//! Durable conversation history
//!
//! The history document is a single JSON list of turns. Writes go through a
//! backup + temp file + atomic rename sequence guarded by a best-effort
//! sidecar lock, so readers only ever observe a complete document.

mod lock;
pub mod store;
pub mod turn;

pub use store::HistoryStore;
pub use turn::{Speaker, Turn};
