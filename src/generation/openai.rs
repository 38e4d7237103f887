use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{ChatMessage, GenerativeBackend};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    r#type: Option<String>,
    code: Option<String>,
}

/// OpenAI chat completions with structured outputs
/// (`response_format: json_schema`).
pub struct OpenAIBackend {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl OpenAIBackend {
    pub fn new(api_key: String, endpoint: Option<String>) -> Result<Self> {
        let client = reqwest::Client::new();
        let endpoint = endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        info!("Initialized OpenAI backend with endpoint: {}", endpoint);

        Ok(Self {
            client,
            api_key,
            endpoint,
        })
    }
}

impl GenerativeBackend for OpenAIBackend {
    fn name(&self) -> &'static str {
        "OpenAI API"
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
                "Requesting {} generation from OpenAI model {}",
                schema_name, model
            );

            let body = serde_json::json!({
                "model": model,
                "messages": messages,
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {
                        "name": schema_name,
                        "strict": true,
                        "schema": schema,
                    }
                }
            });

            let response = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .send()
                .await
                .context("Failed to send request to OpenAI API")?;

            let status = response.status();
            let response_text = response
                .text()
                .await
                .context("Failed to read response body")?;

            if !status.is_success() {
                error!(
                    "OpenAI API request failed with status {}: {}",
                    status, response_text
                );

                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response_text) {
                    return Err(anyhow::anyhow!(
                        "OpenAI API error: {} (type: {:?}, code: {:?})",
                        error_response.error.message,
                        error_response.error.r#type,
                        error_response.error.code
                    ));
                }

                return Err(anyhow::anyhow!(
                    "OpenAI API request failed with status {}: {}",
                    status,
                    response_text
                ));
            }

            let chat_response: ChatResponse = serde_json::from_str(&response_text)
                .context("Failed to parse chat completion response")?;

            let content = chat_response
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .context("OpenAI response contained no choices")?;

            debug!("Generation complete: {} chars", content.len());

            Ok(content)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response_parsing() {
        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": "{\"a\": 1}"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, r#"{"a": 1}"#);
    }

    #[test]
    fn test_error_response_parsing() {
        let raw = r#"{"error": {"message": "bad key", "type": "auth", "code": "401"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.error.message, "bad key");
        assert_eq!(parsed.error.code.as_deref(), Some("401"));
    }
}
