//! Configuration persistence for the flashcards app.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::repository::SortKey;

/// Application configuration that persists between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sort order used by `list` when none is given.
    #[serde(default = "default_sort")]
    pub default_sort: String,

    /// Where the set collection lives. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub ai: AiConfig,
}

/// Settings for AI card generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Model name inserted into the `generateContent` URL.
    pub model: String,
    /// Proxy that forwards to the model URL given in its `quest` parameter.
    pub proxy_url: Option<String>,
    /// Sent as `x-goog-api-key` when talking to the model directly.
    pub api_key: Option<String>,
    pub count: u32,
    pub level: String,
    pub question_lang: String,
    pub answer_lang: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash-exp".to_string(),
            proxy_url: None,
            api_key: None,
            count: 10,
            level: "intermediate".to_string(),
            question_lang: "English".to_string(),
            answer_lang: "English".to_string(),
        }
    }
}

fn default_sort() -> String {
    SortKey::default().as_str().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_sort: default_sort(),
            data_dir: None,
            ai: AiConfig::default(),
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flashmind")
            .join("config.toml")
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey::from_key(&self.default_sort)
    }

    /// Load config from disk, returning default if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}
