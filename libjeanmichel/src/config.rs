//! Configuration management for Jeanmichel

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Location of the two blobs the bot reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding the counter and lexicon objects
    pub bucket: String,
    /// Object holding the posting position, as plain decimal text
    pub counter_object: String,
    /// Object holding the newline-delimited message fragments
    pub lexicon_object: String,
    /// File containing an OAuth2 bearer token for the storage API
    #[serde(default)]
    pub token_file: Option<String>,
    /// Storage API base URL (tests and emulators point this elsewhere)
    #[serde(default = "default_storage_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    /// TOML file with api_key/api_secret/access_token/access_token_secret
    pub credentials_file: String,
    #[serde(default = "default_twitter_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Fixed text prepended to every lexicon fragment
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP entry point binds to when run standalone
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_storage_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_twitter_api_base() -> String {
    "https://api.twitter.com".to_string()
}

fn default_prefix() -> String {
    "Jean-Michel".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig {
                bucket: "jeanmichel-bot".to_string(),
                counter_object: "counter".to_string(),
                lexicon_object: "lexicon".to_string(),
                token_file: None,
                endpoint: default_storage_endpoint(),
            },
            twitter: TwitterConfig {
                credentials_file: "~/.config/jeanmichel/twitter.toml".to_string(),
                api_base: default_twitter_api_base(),
            },
            bot: BotConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("JEANMICHEL_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("jeanmichel").join("config.toml"))
}
