//! First pass: transcript text to structured `DocNotes`.

use anyhow::{Context, Result};
use chrono::Local;
use std::sync::Arc;
use tracing::info;

use super::prompts;
use crate::generation::schema::{doc_notes_schema, DOC_NOTES_SCHEMA_NAME};
use crate::generation::{ChatMessage, Generator};
use crate::notes::DocNotes;

pub struct NoteExtractor {
    generator: Arc<Generator>,
    model: String,
}

impl NoteExtractor {
    pub fn new(generator: Arc<Generator>, model: String) -> Self {
        Self { generator, model }
    }

    /// One schema-constrained generation over the full transcript. The output
    /// is validated before it is returned; a response that deserializes but
    /// breaks the contract (empty topic, malformed due date) is an error, not
    /// a partially usable document.
    pub async fn extract(&self, transcript_text: &str) -> Result<DocNotes> {
        info!("Extracting structured notes from transcription...");

        let messages = [
            ChatMessage::system(prompts::extract_system_prompt(Local::now().date_naive())),
            ChatMessage::user(prompts::extract_user_prompt(transcript_text)),
        ];

        let notes: DocNotes = self
            .generator
            .generate_structured(
                &self.model,
                &messages,
                DOC_NOTES_SCHEMA_NAME,
                &doc_notes_schema(),
            )
            .await?;

        notes
            .validate()
            .context("extracted notes failed validation")?;

        info!(
            "Structured notes extracted: {} subtopics, {} assignments",
            notes.sub_topics.len(),
            notes.assignments.len()
        );

        Ok(notes)
    }
}
