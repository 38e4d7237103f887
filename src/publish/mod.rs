//! Export of finished lectures to Google Docs and Sheets.
//!
//! One document per lecture for the raw transcript, one shared spreadsheet
//! for assignment tracking. There is no rollback: if the spreadsheet write
//! fails after the document was created, the document stays behind. That is
//! preserved behavior; the orphaned id is logged so it can be cleaned up by
//! hand.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::PublishConfig;
use crate::notes::{Assignment, DocNotes};

mod docs;
mod sheets;

pub use docs::DocsClient;
pub use sheets::SheetsClient;

#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub doc_id: String,
    pub sheet_id: String,
}

pub struct Publisher {
    docs: DocsClient,
    sheets: SheetsClient,
    spreadsheet_title: String,
    sheet_range: String,
}

impl Publisher {
    pub fn new(
        docs: DocsClient,
        sheets: SheetsClient,
        spreadsheet_title: String,
        sheet_range: String,
    ) -> Self {
        Self {
            docs,
            sheets,
            spreadsheet_title,
            sheet_range,
        }
    }

    pub fn from_config(config: &PublishConfig) -> Result<Self> {
        let token = config
            .access_token
            .clone()
            .context("publish.access_token is required when publishing is enabled")?;

        Ok(Self {
            docs: DocsClient::new(token.clone(), None),
            sheets: SheetsClient::new(token, None, None),
            spreadsheet_title: config.spreadsheet_title.clone(),
            sheet_range: config.sheet_range.clone(),
        })
    }

    /// Create the lecture document, write the transcript into it, then append
    /// one tracking row per assignment to the shared spreadsheet.
    pub async fn publish(&self, transcript_text: &str, notes: &DocNotes) -> Result<PublishOutcome> {
        let title = format!("{} - Lecture Notes", notes.main_topic);

        let doc_id = self.docs.create(&title).await?;
        self.docs.append_text(&doc_id, transcript_text).await?;

        let sheet_result = self.append_assignments(notes).await;

        let sheet_id = match sheet_result {
            Ok(id) => id,
            Err(e) => {
                // known gap: no compensation for the already-created document
                warn!(
                    "Spreadsheet write failed after document {} was created; document is orphaned",
                    doc_id
                );
                return Err(e);
            }
        };

        info!(
            "Published '{}': doc {}, sheet {}",
            notes.main_topic, doc_id, sheet_id
        );

        Ok(PublishOutcome { doc_id, sheet_id })
    }

    async fn append_assignments(&self, notes: &DocNotes) -> Result<String> {
        let sheet_id = self.sheets.get_or_create(&self.spreadsheet_title).await?;

        if notes.assignments.is_empty() {
            info!("No assignments to track for '{}'", notes.main_topic);
            return Ok(sheet_id);
        }

        let rows = assignment_rows(&notes.assignments);
        self.sheets
            .append_rows(&sheet_id, &self.sheet_range, &rows)
            .await?;

        Ok(sheet_id)
    }
}

/// One spreadsheet row per assignment: title, description or empty, due date.
fn assignment_rows(assignments: &[Assignment]) -> Vec<Vec<String>> {
    assignments
        .iter()
        .map(|a| {
            vec![
                a.title.clone(),
                a.description.clone().unwrap_or_default(),
                a.due_date.clone(),
            ]
        })
        .collect()
}
