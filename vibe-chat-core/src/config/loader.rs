//! Configuration loading and management

use super::schema::Config;
use super::validate::validate_config;
use crate::Error;
use std::path::{Path, PathBuf};

/// Prefix of `VIBE_CHAT__<SECTION>__<KEY>` overrides
const ENV_PREFIX: &str = "VIBE_CHAT__";

/// Short environment aliases: (variable, section, key)
const ENV_ALIASES: &[(&str, &str, &str)] = &[
    ("VIBE_CHAT_HISTORY_FILE", "history", "path"),
    ("VIBE_CHAT_MAX_TURNS", "history", "max_turns"),
    ("VIBE_CHAT_MEMORY", "history", "enabled"),
];

/// Configuration loader
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader with the default config directory
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .map(|h| h.join(".vibe-chat"))
            .unwrap_or_else(|| PathBuf::from(".vibe-chat"));

        Self { config_dir }
    }

    /// Create a new config loader with a custom config directory
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load configuration from file and environment
    ///
    /// Fields missing from `config.json` keep their defaults. Environment
    /// overrides are applied on top, then the result is validated.
    pub fn load(&self) -> crate::Result<Config> {
        let config_path = self.config_path();
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        apply_env_overrides(&mut config)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> crate::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let config_path = self.config_path();
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply aliases first, then `VIBE_CHAT__` overrides in name order
fn apply_env_overrides(config: &mut Config) -> crate::Result<()> {
    for (var, section, key) in ENV_ALIASES {
        if let Ok(value) = std::env::var(var) {
            set_field(config, section, key, &value)
                .map_err(|e| Error::Config(format!("{}: {}", var, e)))?;
        }
    }

    let mut scoped: Vec<(String, String)> = std::env::vars()
        .filter(|(var, _)| var.starts_with(ENV_PREFIX))
        .collect();
    scoped.sort();

    for (var, value) in scoped {
        let Some((section, key)) = var[ENV_PREFIX.len()..].split_once("__") else {
            return Err(Error::Config(format!(
                "{}: expected {}<SECTION>__<KEY>",
                var, ENV_PREFIX
            )));
        };
        set_field(
            config,
            &section.to_ascii_lowercase(),
            &key.to_ascii_lowercase(),
            &value,
        )
        .map_err(|e| Error::Config(format!("{}: {}", var, e)))?;
    }
    Ok(())
}

fn set_field(config: &mut Config, section: &str, key: &str, value: &str) -> Result<(), String> {
    match (section, key) {
        ("history", "enabled") => config.history.enabled = parse_flag(value)?,
        ("history", "path") => config.history.path = value.to_string(),
        ("history", "max_turns") => {
            config.history.max_turns = value
                .trim()
                .parse()
                .map_err(|_| format!("expected a whole number, got '{}'", value))?
        }
        ("chat", "personality") => config.chat.personality = value.to_string(),
        ("chat", "generator") => config.chat.generator = value.to_string(),
        ("chat", "fallback_message") => config.chat.fallback_message = value.to_string(),
        ("logging", "level") => config.logging.level = value.to_string(),
        ("logging", "format") => config.logging.format = value.to_string(),
        ("logging", "dir") => config.logging.dir = value.to_string(),
        ("logging", "console") => config.logging.console = parse_flag(value)?,
        _ => return Err(format!("unknown setting {}.{}", section, key)),
    }
    Ok(())
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!("expected true or false, got '{}'", value)),
    }
}
