//! Personalities and the response pipeline for vibe-chat
//!
//! The pipeline styles the user's text, asks a generator for a reply,
//! styles the reply and records the exchange in the session.

pub mod personality;
pub mod pipeline;

pub use personality::{
    personality_by_name, Personality, Plain, Rizz, Sarcastic, StyleError, StyleResult, Wholesome,
    PERSONALITY_NAMES,
};
pub use pipeline::{PipelineError, ResponsePipeline};
