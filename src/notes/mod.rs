//! Structured note documents produced by the two generation passes.
//!
//! `DocNotes` is the first-pass output: broad coverage of the lecture with
//! subtopics, assignments and takeaways. `EnhancedDocNotes` is the second-pass
//! output: the same subtopics deepened with practice questions and definitions.
//! Assignments and the main topic are copied from the first pass verbatim and
//! are never regenerated, so due dates cannot drift between passes.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTopic {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Due date in YYYY-MM-DD format
    pub due_date: String,
}

/// First-pass structured notes extracted from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocNotes {
    pub main_topic: String,
    pub sub_topics: Vec<SubTopic>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_takeaways: Option<Vec<String>>,
}

/// A subtopic deepened by the second pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedSubTopic {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_questions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<Vec<String>>,
}

/// Raw second-pass model output. Deliberately has no main topic or
/// assignments; those come from the first pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedResult {
    pub sub_topics: Vec<EnhancedSubTopic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_takeaways: Option<Vec<String>>,
}

/// Final artifact: first-pass facts merged with second-pass depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedDocNotes {
    pub main_topic: String,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    pub sub_topics: Vec<EnhancedSubTopic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_takeaways: Option<Vec<String>>,
}

impl DocNotes {
    /// Reject model output that deserialized but does not meet the contract:
    /// an empty main topic or an assignment whose due date is not a real
    /// YYYY-MM-DD calendar date.
    pub fn validate(&self) -> Result<()> {
        if self.main_topic.trim().is_empty() {
            bail!("main_topic is empty");
        }

        for assignment in &self.assignments {
            if assignment.title.trim().is_empty() {
                bail!("assignment has an empty title");
            }
            if NaiveDate::parse_from_str(&assignment.due_date, "%Y-%m-%d").is_err() {
                bail!(
                    "assignment '{}' has invalid due date '{}' (expected YYYY-MM-DD)",
                    assignment.title,
                    assignment.due_date
                );
            }
        }

        Ok(())
    }
}

impl EnhancedDocNotes {
    /// Merge the two passes. `main_topic` and `assignments` are carried over
    /// from the first pass unchanged; only subtopics and takeaways come from
    /// the second-pass result.
    pub fn from_passes(first_pass: &DocNotes, result: EnhancedResult) -> Self {
        Self {
            main_topic: first_pass.main_topic.clone(),
            assignments: first_pass.assignments.clone(),
            sub_topics: result.sub_topics,
            key_takeaways: result.key_takeaways,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_notes() -> DocNotes {
        DocNotes {
            main_topic: "Recursion".to_string(),
            sub_topics: vec![SubTopic {
                title: "Base cases".to_string(),
                description: "Every recursive function needs one".to_string(),
                examples: Some(vec!["factorial(0) = 1".to_string()]),
            }],
            assignments: vec![Assignment {
                title: "Memoization homework".to_string(),
                description: None,
                due_date: "2026-08-28".to_string(),
            }],
            key_takeaways: Some(vec!["Recursion trades loops for stack frames".to_string()]),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_notes() {
        assert!(sample_notes().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_main_topic() {
        let mut notes = sample_notes();
        notes.main_topic = "   ".to_string();
        assert!(notes.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_due_date() {
        let mut notes = sample_notes();
        notes.assignments[0].due_date = "next Friday".to_string();
        assert!(notes.validate().is_err());

        notes.assignments[0].due_date = "2026-13-40".to_string();
        assert!(notes.validate().is_err());
    }

    #[test]
    fn test_assignments_default_to_empty() {
        let parsed: DocNotes = serde_json::from_str(
            r#"{"main_topic": "Sorting", "sub_topics": []}"#,
        )
        .unwrap();
        assert!(parsed.assignments.is_empty());
        assert!(parsed.key_takeaways.is_none());
    }

    #[test]
    fn test_merge_preserves_first_pass_facts() {
        let first = sample_notes();
        let result = EnhancedResult {
            sub_topics: vec![EnhancedSubTopic {
                title: "Base cases".to_string(),
                description: "Deeper take".to_string(),
                examples: None,
                practice_questions: Some(vec!["What happens without one?".to_string()]),
                definitions: Some(vec!["Base case: terminating branch".to_string()]),
            }],
            key_takeaways: Some(vec!["Refined takeaway".to_string()]),
        };

        let enhanced = EnhancedDocNotes::from_passes(&first, result);

        assert_eq!(enhanced.main_topic, first.main_topic);
        assert_eq!(enhanced.assignments, first.assignments);
        // byte-for-byte: the serialized assignment lists are identical
        assert_eq!(
            serde_json::to_string(&enhanced.assignments).unwrap(),
            serde_json::to_string(&first.assignments).unwrap()
        );
        assert_eq!(enhanced.sub_topics.len(), 1);
        assert!(enhanced.sub_topics[0]
            .practice_questions
            .as_ref()
            .is_some_and(|qs| !qs.is_empty()));
    }
}
