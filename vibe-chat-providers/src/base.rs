//! Base trait for response generators

use thiserror::Error;
use vibe_chat_core::Turn;

/// Error type for generator operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Unknown generator '{name}'. Try one of: {available}")]
    UnknownGenerator { name: String, available: String },
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Produces a raw reply for a prompt
///
/// `history` is the conversation before this exchange, oldest first.
/// Implementations may ignore it.
pub trait Generator: Send + Sync {
    /// Generate a reply
    fn generate(&self, prompt: &str, history: &[Turn]) -> ProviderResult<String>;

    /// Registry name of this generator
    fn name(&self) -> &str;
}

/// Replies with the prompt it was given
#[derive(Debug, Default, Clone)]
pub struct EchoGenerator;

impl Generator for EchoGenerator {
    fn generate(&self, prompt: &str, _history: &[Turn]) -> ProviderResult<String> {
        Ok(prompt.to_string())
    }

    fn name(&self) -> &str {
        "echo"
    }
}
