//! Configuration validation rules.

use super::schema::Config;
use crate::history::store::validate_document_path;
use std::path::Path;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if let Err(e) = validate_document_path(Path::new(&config.history.path)) {
        errors.push(format!("history.path: {}", e));
    }
    if config.history.max_turns == 0 {
        errors.push("history.max_turns must be > 0".to_string());
    }

    if config.chat.personality.trim().is_empty() {
        errors.push("chat.personality must not be empty".to_string());
    }
    if config.chat.generator.trim().is_empty() {
        errors.push("chat.generator must not be empty".to_string());
    }
    if config.chat.fallback_message.trim().is_empty() {
        errors.push("chat.fallback_message must not be empty".to_string());
    }

    if config.logging.level.trim().is_empty() {
        errors.push("logging.level must not be empty".to_string());
    }
    if !matches!(
        config.logging.format.to_ascii_lowercase().as_str(),
        "text" | "json"
    ) {
        errors.push(format!(
            "logging.format must be 'text' or 'json', got '{}'",
            config.logging.format
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
