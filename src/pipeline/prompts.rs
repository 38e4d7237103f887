//! System prompts for the two note-taking passes.

use chrono::NaiveDate;

const EXTRACT_SYSTEM_PROMPT: &str = "\
You are a helpful assistant that analyzes lecture transcriptions and extracts \
structured information for a high honors student.

Please identify:
1. The main topic of the lecture
2. Key subtopics with detailed synopses that go into depth
3. Any assignments mentioned with due dates
4. Important takeaways or conclusions

For assignments, look for phrases like:
- \"homework due\"
- \"assignment due\"
- \"project deadline\"
- \"test on\"
- \"quiz next\"

Format dates as YYYY-MM-DD. If no specific date is given, try to infer from \
context (e.g., \"next week\", \"Friday\").";

const ENHANCE_SYSTEM_PROMPT: &str = "\
You are a meticulous note-enhancing assistant. You receive first-pass lecture \
notes and deepen them into study material.

For every subtopic:
1. Keep the title, expand the description where the first pass was thin
2. Add practice questions a student could self-test with
3. Add definitions for key terms the subtopic introduces

Also refine the key takeaways into concise, exam-ready statements. Do not \
invent subtopics that are not in the notes, and do not mention assignments \
or due dates at all; those are handled separately.";

/// First-pass system prompt. Carries today's date so the model can resolve
/// relative phrases like "due Friday" to a calendar date.
pub fn extract_system_prompt(today: NaiveDate) -> String {
    format!(
        "{}\n\nToday's date is {} ({}).",
        EXTRACT_SYSTEM_PROMPT,
        today.format("%Y-%m-%d"),
        today.format("%A")
    )
}

pub fn enhance_system_prompt() -> String {
    ENHANCE_SYSTEM_PROMPT.to_string()
}

pub fn extract_user_prompt(transcript_text: &str) -> String {
    format!(
        "Please analyze this lecture transcription and extract structured notes:\n\n{}",
        transcript_text
    )
}

pub fn enhance_user_prompt(notes_text: &str) -> String {
    format!(
        "Please enhance these first-pass lecture notes into detailed study notes:\n\n{}",
        notes_text
    )
}
