//! Second pass: first-pass notes to study-ready `EnhancedDocNotes`.
//!
//! The second generation only sees the subtopics and takeaways. The main
//! topic and the assignment list never round-trip through the model again;
//! re-deriving them would risk the two passes disagreeing about due dates.

use anyhow::Result;
use std::fmt::Write;
use std::sync::Arc;
use tracing::info;

use super::prompts;
use crate::generation::schema::{enhanced_result_schema, ENHANCED_RESULT_SCHEMA_NAME};
use crate::generation::{ChatMessage, Generator};
use crate::notes::{DocNotes, EnhancedDocNotes, EnhancedResult};

pub struct NoteEnhancer {
    generator: Arc<Generator>,
    model: String,
}

impl NoteEnhancer {
    pub fn new(generator: Arc<Generator>, model: String) -> Self {
        Self { generator, model }
    }

    pub async fn enhance(&self, first_pass: &DocNotes) -> Result<EnhancedDocNotes> {
        info!("Processing notes for enhanced details...");

        let notes_text = render_first_pass(first_pass);

        let messages = [
            ChatMessage::system(prompts::enhance_system_prompt()),
            ChatMessage::user(prompts::enhance_user_prompt(&notes_text)),
        ];

        let result: EnhancedResult = self
            .generator
            .generate_structured(
                &self.model,
                &messages,
                ENHANCED_RESULT_SCHEMA_NAME,
                &enhanced_result_schema(),
            )
            .await?;

        let enhanced = EnhancedDocNotes::from_passes(first_pass, result);

        info!(
            "Enhanced notes complete: {} subtopics",
            enhanced.sub_topics.len()
        );

        Ok(enhanced)
    }
}

/// Serialize the first pass into the prompt body for the second pass.
/// Assignments are deliberately omitted.
fn render_first_pass(notes: &DocNotes) -> String {
    let mut text = format!("Main Topic: {}", notes.main_topic);

    if !notes.sub_topics.is_empty() {
        let _ = write!(text, "\nSubtopics ({}):", notes.sub_topics.len());
        for (i, subtopic) in notes.sub_topics.iter().enumerate() {
            let _ = write!(text, "\n  {}. {}", i + 1, subtopic.title);
            let _ = write!(text, "\n     {}", subtopic.description);
            if let Some(examples) = &subtopic.examples {
                let _ = write!(text, "\n     Examples: {}", examples.join(", "));
            }
        }
    }

    if let Some(takeaways) = &notes.key_takeaways {
        if !takeaways.is_empty() {
            let _ = write!(text, "\nKey takeaways:");
            for takeaway in takeaways {
                let _ = write!(text, "\n  - {}", takeaway);
            }
        }
    }

    text
}
