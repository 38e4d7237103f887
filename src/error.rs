//! Pipeline error kinds.
//!
//! Each stage of the lecture pipeline fails with its own error kind so the
//! orchestrator can log the stage that broke and move the file to `Failed`
//! without aborting the rest of a batch.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input not found: {0:?}")]
    NotFound(PathBuf),

    #[error("transcription failed: {0:#}")]
    Transcription(#[source] anyhow::Error),

    #[error("note extraction failed: {0:#}")]
    Extraction(#[source] anyhow::Error),

    #[error("note enhancement failed: {0:#}")]
    Enhancement(#[source] anyhow::Error),

    #[error("publish failed: {0:#}")]
    Publish(#[source] anyhow::Error),
}

impl PipelineError {
    /// Short stage label used in logs and batch summaries.
    pub fn stage_name(&self) -> &'static str {
        match self {
            PipelineError::NotFound(_) => "input",
            PipelineError::Transcription(_) => "transcription",
            PipelineError::Extraction(_) => "extraction",
            PipelineError::Enhancement(_) => "enhancement",
            PipelineError::Publish(_) => "publish",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        let err = PipelineError::NotFound(PathBuf::from("/tmp/missing.mp3"));
        assert_eq!(err.stage_name(), "input");

        let err = PipelineError::Extraction(anyhow::anyhow!("bad schema"));
        assert_eq!(err.stage_name(), "extraction");
    }

    #[test]
    fn test_not_found_display_includes_path() {
        let err = PipelineError::NotFound(PathBuf::from("/tmp/missing.mp3"));
        assert!(err.to_string().contains("/tmp/missing.mp3"));
    }
}
