//! Collaborators that fail on purpose, used by `chat --inject-error`

use clap::ValueEnum;
use std::sync::Arc;
use vibe_chat_agent::{Personality, StyleError, StyleResult};
use vibe_chat_core::Turn;
use vibe_chat_providers::{Generator, ProviderError, ProviderResult};

/// Where to inject a controlled failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InjectedFault {
    /// Abort before any component is built
    Startup,
    /// Personality fails while styling
    Personality,
    /// Generator fails on every call
    Provider,
    /// Abort after the first reply has been produced
    Response,
}

/// Wraps a personality and fails both styling hooks
pub struct BreakingPersonality {
    inner: Arc<dyn Personality>,
}

impl BreakingPersonality {
    pub fn wrap(inner: Arc<dyn Personality>) -> Arc<dyn Personality> {
        Arc::new(Self { inner })
    }
}

impl Personality for BreakingPersonality {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn style_outbound(&self, _text: &str) -> StyleResult<String> {
        Err(StyleError::Failed(
            "Injected personality failure in style_outbound".to_string(),
        ))
    }

    fn style_inbound(&self, _text: &str) -> StyleResult<String> {
        Err(StyleError::Failed(
            "Injected personality failure in style_inbound".to_string(),
        ))
    }
}

/// Wraps a generator and fails every call
pub struct FaultyGenerator {
    inner: Arc<dyn Generator>,
}

impl FaultyGenerator {
    pub fn wrap(inner: Arc<dyn Generator>) -> Arc<dyn Generator> {
        Arc::new(Self { inner })
    }
}

impl Generator for FaultyGenerator {
    fn generate(&self, _prompt: &str, _history: &[Turn]) -> ProviderResult<String> {
        Err(ProviderError::Generation(
            "Injected provider failure in generate".to_string(),
        ))
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibe_chat_agent::Plain;
    use vibe_chat_providers::EchoGenerator;

    #[test]
    fn test_wrappers_keep_names_and_fail() {
        let personality = BreakingPersonality::wrap(Arc::new(Plain));
        assert_eq!(personality.name(), "plain");
        assert!(personality.style_outbound("hi").is_err());
        assert!(personality.style_inbound("hi").is_err());

        let generator = FaultyGenerator::wrap(Arc::new(EchoGenerator));
        assert_eq!(generator.name(), "echo");
        let err = generator.generate("hi", &[]).unwrap_err();
        assert!(err.to_string().contains("Injected provider failure"));
    }
}
