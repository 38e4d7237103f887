//! Schema-constrained text generation.
//!
//! Both note-taking passes are the same capability: send role-tagged messages
//! plus a target JSON schema, get back an instance of the target type or a
//! validation error. `Generator` wraps a pluggable backend so the pipeline
//! does not care whether the model runs at OpenAI or on a local Ollama server.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info};

mod ollama;
mod openai;

pub mod schema;

pub use ollama::OllamaBackend;
pub use openai::OpenAIBackend;

/// A single role-tagged chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

pub trait GenerativeBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run one schema-constrained generation and return the raw JSON text the
    /// model produced.
    fn generate<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [ChatMessage],
        schema_name: &'a str,
        schema: &'a Value,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    pub api_key: Option<String>,
    pub api_endpoint: Option<String>,
}

pub struct Generator {
    backend: Box<dyn GenerativeBackend>,
}

impl Generator {
    pub fn new(backend: Box<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    pub fn with_backend(backend_name: &str, config: BackendConfig) -> Result<Self> {
        let backend: Box<dyn GenerativeBackend> = match backend_name {
            "openai" => {
                let api_key = config
                    .api_key
                    .context("api_key is required for the OpenAI backend")?;
                Box::new(OpenAIBackend::new(api_key, config.api_endpoint)?)
            }
            "ollama" => Box::new(OllamaBackend::new(config.api_endpoint)?),
            _ => bail!(
                "Unknown generation backend '{}'. Supported backends: openai, ollama",
                backend_name
            ),
        };

        info!("Using {} for structured generation", backend.name());

        Ok(Self { backend })
    }

    /// Request a generation constrained to `schema` and deserialize the model
    /// output into `T`. Output that does not match the schema fails here, not
    /// downstream.
    pub async fn generate_structured<T: DeserializeOwned>(
        &self,
        model: &str,
        messages: &[ChatMessage],
        schema_name: &str,
        schema: &Value,
    ) -> Result<T> {
        let raw = self
            .backend
            .generate(model, messages, schema_name, schema)
            .await?;

        debug!("Raw {} output: {}", schema_name, raw);

        serde_json::from_str(&raw).with_context(|| {
            format!(
                "{} returned output that does not match the {} schema",
                self.backend.name(),
                schema_name
            )
        })
    }
}
