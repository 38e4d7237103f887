use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::config::WhisperConfig;

pub mod providers;

pub use providers::{OpenAIProvider, TranscriptionProvider, WhisperCliProvider};

pub struct Transcriber {
    provider: Box<dyn TranscriptionProvider>,
    language: String,
}

impl Transcriber {
    pub fn new(provider: Box<dyn TranscriptionProvider>, language: String) -> Self {
        Self { provider, language }
    }

    pub fn with_provider(provider_name: &str, config: ProviderConfig) -> Result<Self> {
        let language = config.language.clone().unwrap_or_else(|| "en".to_string());

        let provider: Box<dyn TranscriptionProvider> = match provider_name {
            "openai-api" => {
                let api_key = config
                    .api_key
                    .context("api_key is required for OpenAI API provider")?;

                let model = config.model.unwrap_or_else(|| "whisper-1".to_string());
                Box::new(OpenAIProvider::new(api_key, config.api_endpoint, model)?)
            }
            "whisper-cli" => {
                let model = config.model.unwrap_or_else(|| "base".to_string());
                Box::new(WhisperCliProvider::new(
                    config.command_path,
                    model,
                    config.model_path,
                )?)
            }
            _ => bail!(
                "Unknown transcription provider '{}'. Supported providers: openai-api, whisper-cli",
                provider_name
            ),
        };

        info!("Using {} for transcription", provider.name());

        Ok(Self { provider, language })
    }

    pub async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        info!(
            "Transcribing audio file: {:?} with {}",
            audio_path,
            self.provider.name()
        );
        self.provider.transcribe(audio_path, &self.language).await
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub model: Option<String>,
    pub language: Option<String>,
    pub command_path: Option<String>,
    pub model_path: Option<String>,
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: None,
            language: Some("en".to_string()),
            command_path: None,
            model_path: None,
            api_endpoint: None,
            api_key: None,
        }
    }
}

impl From<&WhisperConfig> for ProviderConfig {
    fn from(whisper: &WhisperConfig) -> Self {
        Self {
            model: whisper.model.clone(),
            language: whisper.language.clone(),
            command_path: whisper.command_path.clone(),
            model_path: whisper.model_path.clone(),
            api_endpoint: whisper.api_endpoint.clone(),
            api_key: whisper.api_key.clone(),
        }
    }
}

// ============================================================================
// Provider status and validation
// ============================================================================

/// Status of the transcription provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Provider is configured and ready
    Ready {
        provider: String,
        model: Option<String>,
        language: Option<String>,
    },
    /// Provider is configured but validation failed
    ConfigError { provider: String, error: String },
    /// No provider configured
    NotConfigured,
}

/// Get provider status from a WhisperConfig.
pub fn get_provider_status_from_config(whisper: &WhisperConfig) -> Result<ProviderStatus> {
    let provider = match &whisper.provider {
        Some(p) if !p.is_empty() => p.clone(),
        _ => return Ok(ProviderStatus::NotConfigured),
    };

    if let Some(error) = validate_provider_config(&provider, whisper) {
        return Ok(ProviderStatus::ConfigError { provider, error });
    }

    let provider_config = ProviderConfig::from(whisper);
    match Transcriber::with_provider(&provider, provider_config) {
        Ok(_) => Ok(ProviderStatus::Ready {
            provider,
            model: whisper.model.clone(),
            language: whisper.language.clone(),
        }),
        Err(e) => Ok(ProviderStatus::ConfigError {
            provider,
            error: e.to_string(),
        }),
    }
}

/// Validate provider configuration and return an error message if invalid.
pub fn validate_provider_config(provider: &str, whisper: &WhisperConfig) -> Option<String> {
    match provider {
        "openai-api" => {
            if whisper.api_key.is_none() {
                Some("API key required for OpenAI API".to_string())
            } else {
                None
            }
        }
        "whisper-cli" => {
            if whisper.command_path.is_none() && which::which("whisper").is_err() {
                Some("whisper binary not found; set command_path".to_string())
            } else {
                None
            }
        }
        _ => Some(format!("Unknown provider: {}", provider)),
    }
}
