//! JSON schemas for the two structured generation passes.
//!
//! Field descriptions double as instructions to the model, so they carry the
//! same level of detail a prompt would.

use serde_json::{json, Value};

pub const DOC_NOTES_SCHEMA_NAME: &str = "doc_notes";
pub const ENHANCED_RESULT_SCHEMA_NAME: &str = "enhanced_result";

/// Schema for the first-pass `DocNotes` document.
pub fn doc_notes_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "main_topic": {
                "type": "string",
                "description": "The overall topic of the entire lecture"
            },
            "sub_topics": {
                "type": "array",
                "description": "List of structured subtopics with detailed information",
                "items": sub_topic_properties(false),
            },
            "assignments": {
                "type": "array",
                "description": "List of assignments or tasks mentioned in the lecture, if any",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "The name or title of the assignment"
                        },
                        "description": {
                            "type": ["string", "null"],
                            "description": "A detailed description of the expectations of the assignment"
                        },
                        "due_date": {
                            "type": "string",
                            "description": "The due date of the assignment in YYYY-MM-DD format"
                        }
                    },
                    "required": ["title", "description", "due_date"],
                    "additionalProperties": false
                }
            },
            "key_takeaways": {
                "type": ["array", "null"],
                "description": "Optional key takeaways or important points from the lecture",
                "items": { "type": "string" }
            }
        },
        "required": ["main_topic", "sub_topics", "assignments", "key_takeaways"],
        "additionalProperties": false
    })
}

/// Schema for the second-pass `EnhancedResult`: enhanced subtopics plus
/// refined takeaways. No assignments here; they come from the first pass.
pub fn enhanced_result_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "sub_topics": {
                "type": "array",
                "description": "First-pass subtopics enriched with study material",
                "items": sub_topic_properties(true),
            },
            "key_takeaways": {
                "type": ["array", "null"],
                "description": "Refined key takeaways from the lecture",
                "items": { "type": "string" }
            }
        },
        "required": ["sub_topics", "key_takeaways"],
        "additionalProperties": false
    })
}

fn sub_topic_properties(enhanced: bool) -> Value {
    let mut properties = json!({
        "title": {
            "type": "string",
            "description": "The title or heading of the subtopic"
        },
        "description": {
            "type": "string",
            "description": "Detailed explanation or summary of the subtopic"
        },
        "examples": {
            "type": ["array", "null"],
            "description": "Optional examples, case studies or supporting points related to the subtopic",
            "items": { "type": "string" }
        }
    });

    let mut required = vec!["title", "description", "examples"];

    if enhanced {
        let map = properties.as_object_mut().expect("schema is an object");
        map.insert(
            "practice_questions".to_string(),
            json!({
                "type": ["array", "null"],
                "description": "Practice questions a student could use to self-test on this subtopic",
                "items": { "type": "string" }
            }),
        );
        map.insert(
            "definitions".to_string(),
            json!({
                "type": ["array", "null"],
                "description": "Definitions of key terms introduced in this subtopic",
                "items": { "type": "string" }
            }),
        );
        required.push("practice_questions");
        required.push("definitions");
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}
