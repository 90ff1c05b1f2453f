//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for vibe-chat
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Conversation history persistence
    #[serde(default)]
    pub history: HistoryConfig,
    /// Generator and personality selection
    #[serde(default)]
    pub chat: ChatConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Conversation history persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Persist turns across restarts
    #[serde(default)]
    pub enabled: bool,
    /// Path of the history document
    #[serde(default = "default_history_path")]
    pub path: String,
    /// Maximum number of turns kept on disk
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

fn default_history_path() -> String {
    "conversation_history.json".to_string()
}

fn default_max_turns() -> usize {
    1000
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_history_path(),
            max_turns: default_max_turns(),
        }
    }
}

/// Chat behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Personality used to style prompts and replies
    #[serde(default = "default_personality")]
    pub personality: String,
    /// Generator producing raw replies
    #[serde(default = "default_generator")]
    pub generator: String,
    /// Reply for empty input
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

fn default_personality() -> String {
    "rizz".to_string()
}

fn default_generator() -> String {
    "local-rules".to_string()
}

pub fn default_fallback_message() -> String {
    "Say something fun, I'm listening 😉".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            personality: default_personality(),
            generator: default_generator(),
            fallback_message: default_fallback_message(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Also write logs to stderr
    #[serde(default)]
    pub console: bool,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            console: false,
            overrides: HashMap::new(),
        }
    }
}
