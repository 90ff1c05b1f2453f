//! Response pipeline: style, generate, style, record

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use vibe_chat_core::config::{default_fallback_message, HistoryConfig};
use vibe_chat_core::utils::truncate;
use vibe_chat_core::{ConversationSession, Turn};
use vibe_chat_providers::{Generator, ProviderError};

use crate::personality::{Personality, StyleError};

/// Characters of user text shown in log lines
const LOG_PREVIEW_CHARS: usize = 80;

/// A collaborator failed while producing a reply
///
/// The variant names the stage; the payload is the collaborator's own error.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    OutboundStyle(StyleError),

    #[error(transparent)]
    Generator(ProviderError),

    #[error(transparent)]
    InboundStyle(StyleError),
}

/// Turns one user message into one styled reply and records the exchange
pub struct ResponsePipeline {
    generator: Arc<dyn Generator>,
    personality: Arc<dyn Personality>,
    session: ConversationSession,
    fallback: String,
}

impl ResponsePipeline {
    pub fn new(
        generator: Arc<dyn Generator>,
        personality: Arc<dyn Personality>,
        session: ConversationSession,
    ) -> Self {
        info!(
            "Response pipeline ready: generator={}, personality={}, memory={}",
            generator.name(),
            personality.name(),
            session.persistence_enabled()
        );
        Self {
            generator,
            personality,
            session,
            fallback: default_fallback_message(),
        }
    }

    /// Build a pipeline whose session persists only when `config.enabled`
    pub fn from_config(
        generator: Arc<dyn Generator>,
        personality: Arc<dyn Personality>,
        config: &HistoryConfig,
    ) -> vibe_chat_core::Result<Self> {
        let session = ConversationSession::from_config(config)?;
        Ok(Self::new(generator, personality, session))
    }

    /// Replace the reply used for blank input
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Produce a reply for `user_text`
    ///
    /// Blank input gets the fallback reply and leaves the session untouched.
    /// On any collaborator error nothing is recorded.
    pub fn respond(&mut self, user_text: &str) -> Result<String, PipelineError> {
        if user_text.trim().is_empty() {
            debug!("Blank input, replying with fallback");
            return Ok(self.fallback.clone());
        }

        debug!(
            "Responding to: {}",
            truncate(user_text, LOG_PREVIEW_CHARS)
        );

        let styled_prompt = self
            .personality
            .style_outbound(user_text)
            .map_err(|e| {
                warn!("Outbound styling failed ({}): {}", self.personality.name(), e);
                PipelineError::OutboundStyle(e)
            })?;

        let raw = self
            .generator
            .generate(&styled_prompt, self.session.history())
            .map_err(|e| {
                warn!("Generator {} failed: {}", self.generator.name(), e);
                PipelineError::Generator(e)
            })?;

        let reply = self.personality.style_inbound(&raw).map_err(|e| {
            warn!("Inbound styling failed ({}): {}", self.personality.name(), e);
            PipelineError::InboundStyle(e)
        })?;

        self.session.record_exchange(user_text, reply.as_str());
        debug!("Session now holds {} turns", self.session.len());

        Ok(reply)
    }

    pub fn history(&self) -> &[Turn] {
        self.session.history()
    }

    /// Forget the conversation, including the stored document when enabled
    pub fn clear(&mut self) {
        self.session.clear();
        info!("Conversation cleared");
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn personality_name(&self) -> &str {
        self.personality.name()
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }
}
