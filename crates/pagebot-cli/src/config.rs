//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for pagebot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default model to use
    pub model: Option<String>,
    /// Base URL of an OpenAI-compatible endpoint
    pub base_url: Option<String>,
    /// Model context window in tokens
    pub context_window: Option<u32>,
    /// API key (alternative to the OPENAI_API_KEY environment variable)
    pub api_key: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pagebot")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for PAGEBOT_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("PAGEBOT_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            model: Some("gpt-4o".to_string()),
            base_url: None,
            context_window: None,
            api_key: None,
        };

        default_config.save()?;
        Ok(path)
    }

    /// Get the API key, checking config then environment
    pub fn get_api_key(&self) -> Option<String> {
        if self.api_key.is_some() {
            return self.api_key.clone();
        }
        std::env::var("OPENAI_API_KEY").ok()
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# pagebot configuration file
# Place at ~/.config/pagebot/config.toml (Linux/Mac) or %APPDATA%\pagebot\config.toml (Windows)

# Default model to use
model = "gpt-4o"

# Base URL of an OpenAI-compatible endpoint (optional)
# base_url = "http://localhost:11434/v1"

# Model context window in tokens (optional, defaults to 128000)
# context_window = 128000

# API key (optional - it's recommended to use the OPENAI_API_KEY
# environment variable instead for security)
# api_key = "sk-..."
"#
}
