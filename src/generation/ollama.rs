use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{ChatMessage, GenerativeBackend};

const DEFAULT_SERVER_URL: &str = "http://localhost:11434";
// Local models are slow on first load
const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

/// Ollama `/api/chat` with the target schema passed as the `format` field,
/// which constrains local model output the same way OpenAI structured
/// outputs do.
pub struct OllamaBackend {
    client: reqwest::Client,
    chat_url: String,
}

impl OllamaBackend {
    pub fn new(server_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::new();
        let base = server_url.unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let chat_url = format!("{}/api/chat", base.trim_end_matches('/'));

        info!("Initialized Ollama backend at {}", chat_url);

        Ok(Self { client, chat_url })
    }
}

impl GenerativeBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    fn generate<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [ChatMessage],
        schema_name: &'a str,
        schema: &'a Value,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                "Requesting {} generation from Ollama model {}",
                schema_name, model
            );

            let body = serde_json::json!({
                "model": model,
                "messages": messages,
                "format": schema,
                "stream": false,
            });

            let response = self
                .client
                .post(&self.chat_url)
                .json(&body)
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .send()
                .await
                .map_err(|e| {
                    if e.is_connect() {
                        anyhow::anyhow!(
                            "Cannot connect to Ollama at {}. Is the server running? Start with: ollama serve",
                            self.chat_url
                        )
                    } else {
                        anyhow::anyhow!("Ollama request failed: {}", e)
                    }
                })?;

            let status = response.status();
            let response_text = response
                .text()
                .await
                .context("Failed to read response body")?;

            if !status.is_success() {
                error!(
                    "Ollama request failed with status {}: {}",
                    status, response_text
                );
                return Err(anyhow::anyhow!(
                    "Ollama request failed with status {}: {}",
                    status,
                    response_text
                ));
            }

            let ollama_response: OllamaResponse =
                serde_json::from_str(&response_text).context("Failed to parse Ollama response")?;

            let content = ollama_response.message.content.trim().to_string();
            debug!("Generation complete: {} chars", content.len());

            Ok(content)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_url_from_server_url() {
        let backend = OllamaBackend::new(Some("http://localhost:11434/".to_string())).unwrap();
        assert_eq!(backend.chat_url, "http://localhost:11434/api/chat");

        let backend = OllamaBackend::new(None).unwrap();
        assert_eq!(backend.chat_url, "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_ollama_response_parsing() {
        let raw = r#"{"message": {"role": "assistant", "content": " {\"x\": 1} "}, "done": true}"#;
        let parsed: OllamaResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.message.content, " {\"x\": 1} ");
    }
}
