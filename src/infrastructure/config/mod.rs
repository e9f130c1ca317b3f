//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub plugins: PluginConfig,
    pub storage: StorageConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    /// Command prefix, matched literally at the start of a message.
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginConfig {
    /// Root directory walked for dynamic plugin units.
    pub directory: PathBuf,
    pub auto_load: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "warden-bot".to_string(),
                prefix: ".".to_string(),
            },
            plugins: PluginConfig {
                directory: PathBuf::from("./plugins"),
                auto_load: true,
            },
            storage: StorageConfig {
                path: PathBuf::from("warden.db"),
            },
            adapters: AdaptersConfig {
                telegram: Some(TelegramConfig {
                    enabled: false,
                    token: None,
                }),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();

        if let Ok(token) = std::env::var("BOT_TOKEN") {
            if let Some(ref mut tg) = config.adapters.telegram {
                tg.token = Some(token);
                tg.enabled = true;
            }
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            config.bot.prefix = prefix;
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::InvalidValue(
                "bot.prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Telegram token, if the adapter is enabled and configured.
    pub fn telegram_token(&self) -> Option<&str> {
        self.adapters
            .telegram
            .as_ref()
            .filter(|tg| tg.enabled)
            .and_then(|tg| tg.token.as_deref())
    }
}
