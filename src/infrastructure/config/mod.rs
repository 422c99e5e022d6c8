//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub mods: ModsConfig,
    #[serde(default)]
    pub polls: PollsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    #[serde(default)]
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModsConfig {
    /// Directory scanned for mod manifests
    pub directory: PathBuf,
    pub auto_load: bool,
    /// Builtin mods registered without a manifest
    #[serde(default)]
    pub enabled: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PollsConfig {
    /// How often finished polls are checked for and announced
    pub check_interval_ms: u64,
}

impl Default for PollsConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "modbot".to_string(),
                prefix: "!".to_string(),
                channels: vec!["#console".to_string()],
            },
            mods: ModsConfig {
                directory: PathBuf::from("./mods"),
                auto_load: true,
                enabled: vec!["chatlog".to_string()],
            },
            polls: PollsConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::InvalidValue("bot.prefix must not be empty".to_string()));
        }
        if self.polls.check_interval_ms == 0 {
            return Err(ConfigError::InvalidValue("polls.check-interval-ms must be positive".to_string()));
        }
        Ok(())
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            if !prefix.is_empty() {
                config.bot.prefix = prefix;
            }
        }

        if let Ok(dir) = std::env::var("BOT_MODS_DIR") {
            config.mods.directory = PathBuf::from(dir);
        }

        if let Ok(channels) = std::env::var("BOT_CHANNELS") {
            config.bot.channels = channels
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        }

        config
    }
}
