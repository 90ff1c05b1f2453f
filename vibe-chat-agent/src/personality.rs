//! Personalities that decorate prompts on the way out and replies on the way in

use rand::seq::SliceRandom;
use std::sync::Arc;
use thiserror::Error;
use vibe_chat_providers::{category_of_reply, classify, Category};

/// Error raised while styling text
#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Styling failed: {0}")]
    Failed(String),

    #[error("Unknown personality '{name}'. Try one of: {available}")]
    UnknownPersonality { name: String, available: String },
}

pub type StyleResult<T> = Result<T, StyleError>;

/// Text-to-text styling applied around the generator
///
/// Both hooks default to identity, which is the `plain` personality.
pub trait Personality: Send + Sync {
    /// Registry name of this personality
    fn name(&self) -> &str;

    /// Transform the user's text before it reaches the generator
    fn style_outbound(&self, text: &str) -> StyleResult<String> {
        Ok(text.to_string())
    }

    /// Transform the generator's raw reply before it is shown and stored
    fn style_inbound(&self, text: &str) -> StyleResult<String> {
        Ok(text.to_string())
    }
}

/// Names accepted by [`personality_by_name`]
pub const PERSONALITY_NAMES: &[&str] = &["plain", "rizz", "sarcastic", "wholesome"];

/// Resolve a personality by its registry name
pub fn personality_by_name(name: &str) -> StyleResult<Arc<dyn Personality>> {
    match name.trim().to_lowercase().as_str() {
        "plain" | "none" => Ok(Arc::new(Plain)),
        "rizz" => Ok(Arc::new(Rizz)),
        "sarcastic" => Ok(Arc::new(Sarcastic)),
        "wholesome" => Ok(Arc::new(Wholesome)),
        _ => Err(StyleError::UnknownPersonality {
            name: name.to_string(),
            available: PERSONALITY_NAMES.join(", "),
        }),
    }
}

/// No styling in either direction
#[derive(Debug, Default, Clone, Copy)]
pub struct Plain;

impl Personality for Plain {
    fn name(&self) -> &str {
        "plain"
    }
}

/// Smooth talker
#[derive(Debug, Default, Clone, Copy)]
pub struct Rizz;

impl Rizz {
    fn vary(reply: &str) -> String {
        let variations = [
            reply.to_string(),
            format!("{} 😉", reply),
            format!("{} 😎", reply),
            format!("{} Stay vibing!", reply),
        ];
        variations
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| reply.to_string())
    }

    fn flourish(category: Category, text: &str) -> String {
        match category {
            Category::Greeting => format!("😎 {} What's good?", text),
            Category::Motivation => format!("💪 {} Keep grinding, champ!", text),
            Category::Technical => format!("💻 {} Nerd mode activated!", text),
            Category::Joke => format!("😂 {} Can't stop laughing!", text),
            Category::Advice => format!("🧠 {} Wise words, my friend.", text),
            _ => format!("🔥 {} Stay smooth, my friend!", text),
        }
    }
}

impl Personality for Rizz {
    fn name(&self) -> &str {
        "rizz"
    }

    fn style_outbound(&self, text: &str) -> StyleResult<String> {
        Ok(format!("🔥 {} Stay smooth.", text))
    }

    fn style_inbound(&self, text: &str) -> StyleResult<String> {
        let category = category_of_reply(text).unwrap_or_else(|| classify(text));
        let varied = Self::vary(text);
        Ok(Self::flourish(category, &varied))
    }
}

/// Dry and unimpressed
#[derive(Debug, Default, Clone, Copy)]
pub struct Sarcastic;

impl Personality for Sarcastic {
    fn name(&self) -> &str {
        "sarcastic"
    }

    fn style_outbound(&self, text: &str) -> StyleResult<String> {
        Ok(format!(
            "Obviously, the user said: {}. Make it sound clever.",
            text
        ))
    }

    fn style_inbound(&self, text: &str) -> StyleResult<String> {
        Ok(format!("Sure, because that was super hard: {} 🙃", text))
    }
}

const AFFIRMATIONS: &[&str] = &[
    "You're doing amazing today! 💖",
    "Take a deep breath, everything is going great 🌸",
    "Every line of code you write matters! Keep going 💪",
    "Believe in yourself, you've got this 🌈",
    "You're capable of more than you think! ✨",
    "Keep smiling, your vibe is contagious 😄",
    "Small steps every day lead to big wins! 🌟",
    "You got this! Stay awesome 💖",
];

/// Leaves prompts alone and adds encouragement to replies
#[derive(Debug, Default, Clone, Copy)]
pub struct Wholesome;

impl Personality for Wholesome {
    fn name(&self) -> &str {
        "wholesome"
    }

    fn style_inbound(&self, text: &str) -> StyleResult<String> {
        match AFFIRMATIONS.choose(&mut rand::thread_rng()) {
            Some(affirmation) => Ok(format!("{} {}", text, affirmation)),
            None => Ok(text.to_string()),
        }
    }
}
