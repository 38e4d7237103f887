use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, info};

const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DEFAULT_DRIVE_URL: &str = "https://www.googleapis.com/drive/v3/files";

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreateSpreadsheetResponse {
    #[serde(rename = "spreadsheetId")]
    spreadsheet_id: String,
}

/// Minimal Google Sheets client: find-or-create a spreadsheet by title and
/// append rows to it. Title lookup goes through the Drive search endpoint;
/// the Sheets API itself cannot search by name.
pub struct SheetsClient {
    client: reqwest::Client,
    access_token: String,
    sheets_url: String,
    drive_url: String,
}

impl SheetsClient {
    pub fn new(
        access_token: String,
        sheets_url: Option<String>,
        drive_url: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token,
            sheets_url: sheets_url.unwrap_or_else(|| DEFAULT_SHEETS_URL.to_string()),
            drive_url: drive_url.unwrap_or_else(|| DEFAULT_DRIVE_URL.to_string()),
        }
    }

    /// Look the spreadsheet up by exact title; create it on first use.
    pub async fn get_or_create(&self, title: &str) -> Result<String> {
        if let Some(id) = self.find_by_title(title).await? {
            debug!("Found existing spreadsheet '{}': {}", title, id);
            return Ok(id);
        }

        self.create(title).await
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<String>> {
        let escaped = title.replace('\'', "\\'");
        let query = format!(
            "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
            escaped
        );

        let response = self
            .client
            .get(&self.drive_url)
            .bearer_auth(&self.access_token)
            .query(&[("q", query.as_str()), ("fields", "files(id)")])
            .send()
            .await
            .context("Failed to send spreadsheet lookup request")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read spreadsheet lookup response")?;

        if !status.is_success() {
            error!(
                "Spreadsheet lookup failed with status {}: {}",
                status, response_text
            );
            return Err(anyhow::anyhow!(
                "Spreadsheet lookup failed with status {}: {}",
                status,
                response_text
            ));
        }

        let list: DriveFileList = serde_json::from_str(&response_text)
            .context("Failed to parse spreadsheet lookup response")?;

        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create(&self, title: &str) -> Result<String> {
        debug!("Creating spreadsheet titled '{}'", title);

        let response = self
            .client
            .post(&self.sheets_url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "properties": { "title": title } }))
            .send()
            .await
            .context("Failed to send spreadsheet create request")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read spreadsheet create response")?;

        if !status.is_success() {
            error!(
                "Spreadsheet create failed with status {}: {}",
                status, response_text
            );
            return Err(anyhow::anyhow!(
                "Spreadsheet create failed with status {}: {}",
                status,
                response_text
            ));
        }

        let created: CreateSpreadsheetResponse = serde_json::from_str(&response_text)
            .context("Failed to parse spreadsheet create response")?;

        info!("Created spreadsheet {}", created.spreadsheet_id);
        Ok(created.spreadsheet_id)
    }

    pub async fn append_rows(
        &self,
        sheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<()> {
        let url = format!("{}/{}/values/{}:append", self.sheets_url, sheet_id, range);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&serde_json::json!({ "values": rows }))
            .send()
            .await
            .context("Failed to send row append request")?;

        let status = response.status();
        if !status.is_success() {
            let response_text = response.text().await.unwrap_or_default();
            error!(
                "Row append failed with status {}: {}",
                status, response_text
            );
            return Err(anyhow::anyhow!(
                "Row append failed with status {}: {}",
                status,
                response_text
            ));
        }

        info!("Appended {} row(s) to spreadsheet {}", rows.len(), sheet_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_file_list_parsing() {
        let raw = r#"{"files": [{"id": "sheet-1"}, {"id": "sheet-2"}]}"#;
        let parsed: DriveFileList = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.files[0].id, "sheet-1");

        let empty: DriveFileList = serde_json::from_str("{}").unwrap();
        assert!(empty.files.is_empty());
    }

    #[test]
    fn test_create_response_parsing() {
        let raw = r#"{"spreadsheetId": "sheet-9"}"#;
        let parsed: CreateSpreadsheetResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.spreadsheet_id, "sheet-9");
    }
}
