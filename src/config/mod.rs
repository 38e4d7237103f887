use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub whisper: WhisperConfig,
    pub model: ModelConfig,
    pub publish: PublishConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhisperConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub language: Option<String>,
    pub command_path: Option<String>,
    /// Directory holding downloaded whisper models (whisper-cli only)
    pub model_path: Option<String>,
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
}

/// Generative model settings for the two note-taking passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Generation backend: "openai" or "ollama"
    pub backend: Option<String>,
    /// Model used for the first (extraction) pass
    pub extract_model: Option<String>,
    /// Model used for the second (enhancement) pass
    pub enhance_model: Option<String>,
    pub api_key: Option<String>,
    /// Chat endpoint override; for Ollama this is the server URL
    pub api_endpoint: Option<String>,
}

/// Publication settings for the Google Docs/Sheets export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub enabled: bool,
    /// OAuth bearer token with documents + spreadsheets + drive scopes.
    /// Obtaining and refreshing the token is out of scope; it is treated
    /// as a configured dependency.
    pub access_token: Option<String>,
    pub spreadsheet_title: String,
    pub sheet_range: String,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            provider: Some("openai-api".to_string()),
            model: Some("whisper-1".to_string()),
            language: Some("en".to_string()),
            command_path: None,
            model_path: None,
            api_endpoint: None,
            api_key: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: Some("openai".to_string()),
            extract_model: Some("gpt-4.1-nano".to_string()),
            enhance_model: Some("gpt-4.1".to_string()),
            api_key: None,
            api_endpoint: None,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            access_token: None,
            spreadsheet_title: "Assignments Tracker".to_string(),
            sheet_range: "Sheet1!A:C".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.whisper.provider.as_deref(), Some("openai-api"));
        assert_eq!(parsed.model.backend.as_deref(), Some("openai"));
        assert_eq!(parsed.publish.spreadsheet_title, "Assignments Tracker");
        assert!(!parsed.publish.enabled);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [model]
            backend = "ollama"
            extract_model = "mistral"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.model.backend.as_deref(), Some("ollama"));
        assert_eq!(parsed.model.extract_model.as_deref(), Some("mistral"));
        // untouched sections fall back to defaults
        assert_eq!(parsed.whisper.language.as_deref(), Some("en"));
        assert_eq!(parsed.publish.sheet_range, "Sheet1!A:C");
    }
}
