use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, info};

const DEFAULT_BASE_URL: &str = "https://docs.googleapis.com/v1/documents";

#[derive(Debug, Deserialize)]
struct CreateDocResponse {
    #[serde(rename = "documentId")]
    document_id: String,
}

/// Minimal Google Docs client: create a document, insert text.
///
/// The bearer token is a configured dependency; obtaining and refreshing it
/// is out of scope here.
pub struct DocsClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl DocsClient {
    pub fn new(access_token: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub async fn create(&self, title: &str) -> Result<String> {
        debug!("Creating document titled '{}'", title);

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await
            .context("Failed to send document create request")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read document create response")?;

        if !status.is_success() {
            error!(
                "Document create failed with status {}: {}",
                status, response_text
            );
            return Err(anyhow::anyhow!(
                "Document create failed with status {}: {}",
                status,
                response_text
            ));
        }

        let created: CreateDocResponse = serde_json::from_str(&response_text)
            .context("Failed to parse document create response")?;

        info!("Created document {}", created.document_id);
        Ok(created.document_id)
    }

    pub async fn append_text(&self, doc_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/{}:batchUpdate", self.base_url, doc_id);

        // insert at index 1, the start of the document body
        let body = serde_json::json!({
            "requests": [{
                "insertText": {
                    "location": { "index": 1 },
                    "text": text,
                }
            }]
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .context("Failed to send document batchUpdate request")?;

        let status = response.status();
        if !status.is_success() {
            let response_text = response.text().await.unwrap_or_default();
            error!(
                "Document batchUpdate failed with status {}: {}",
                status, response_text
            );
            return Err(anyhow::anyhow!(
                "Document batchUpdate failed with status {}: {}",
                status,
                response_text
            ));
        }

        info!("Wrote {} chars into document {}", text.len(), doc_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_response_parsing() {
        let raw = r#"{"documentId": "doc-123", "title": "Recursion - Lecture Notes"}"#;
        let parsed: CreateDocResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.document_id, "doc-123");
    }
}
