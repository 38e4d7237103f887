//! Per-file pipeline orchestration.
//!
//! Each input file walks a strictly sequential state machine:
//! `Pending -> Transcribed -> Extracted -> Enhanced -> Published | Failed`.
//! A stage failure fails that file only; batch processing records the
//! failure and moves on to the next file. Every successful transition
//! persists its artifact to disk, so a rerun for the same stem resumes from
//! the last completed stage instead of repeating model calls.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::PipelineError;
use crate::notes::{DocNotes, EnhancedDocNotes};
use crate::publish::{PublishOutcome, Publisher};
use crate::transcript::{stem_of, write_json_atomic, TranscriptStore};

mod enhance;
mod extract;
pub mod prompts;

pub use enhance::NoteEnhancer;
pub use extract::NoteExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pending,
    Transcribed,
    Extracted,
    Enhanced,
    Published,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Pending => "pending",
            Stage::Transcribed => "transcribed",
            Stage::Extracted => "extracted",
            Stage::Enhanced => "enhanced",
            Stage::Published => "published",
            Stage::Failed => "failed",
        }
    }
}

/// Terminal record for one processed file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub stage: Stage,
    pub notes: Option<EnhancedDocNotes>,
    pub publish: Option<PublishOutcome>,
    pub error: Option<PipelineError>,
}

impl FileOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub total: usize,
}

pub struct Orchestrator {
    store: TranscriptStore,
    extractor: NoteExtractor,
    enhancer: NoteEnhancer,
    publisher: Option<Publisher>,
    notes_dir: PathBuf,
    enhanced_dir: PathBuf,
    force: bool,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: TranscriptStore,
        extractor: NoteExtractor,
        enhancer: NoteEnhancer,
        publisher: Option<Publisher>,
        notes_dir: PathBuf,
        enhanced_dir: PathBuf,
        force: bool,
    ) -> Result<Self> {
        std::fs::create_dir_all(&notes_dir)
            .with_context(|| format!("Failed to create notes directory: {:?}", notes_dir))?;
        std::fs::create_dir_all(&enhanced_dir)
            .with_context(|| format!("Failed to create notes directory: {:?}", enhanced_dir))?;

        Ok(Self {
            store,
            extractor,
            enhancer,
            publisher,
            notes_dir,
            enhanced_dir,
            force,
        })
    }

    /// Run one file through the whole pipeline. Stage failures are logged
    /// here and reported through the outcome; they never propagate as `Err`,
    /// so a batch caller can keep going.
    pub async fn process_file(&self, audio_path: &Path) -> FileOutcome {
        info!("Starting processing of: {:?}", audio_path);

        match self.run_stages(audio_path).await {
            Ok((stage, notes, publish)) => {
                info!(
                    "Processing complete for {:?} (final stage: {})",
                    audio_path,
                    stage.as_str()
                );
                FileOutcome {
                    path: audio_path.to_path_buf(),
                    stage,
                    notes: Some(notes),
                    publish,
                    error: None,
                }
            }
            Err(e) => {
                error!(
                    "Processing failed for {:?} at {} stage: {}",
                    audio_path,
                    e.stage_name(),
                    e
                );
                FileOutcome {
                    path: audio_path.to_path_buf(),
                    stage: Stage::Failed,
                    notes: None,
                    publish: None,
                    error: Some(e),
                }
            }
        }
    }

    async fn run_stages(
        &self,
        audio_path: &Path,
    ) -> Result<(Stage, EnhancedDocNotes, Option<PublishOutcome>), PipelineError> {
        // PENDING -> TRANSCRIBED
        let transcript = self.store.get_or_create(audio_path).await?;

        // TRANSCRIBED -> EXTRACTED
        let first_pass = self.extract_stage(&transcript.stem, &transcript.text).await?;

        // EXTRACTED -> ENHANCED
        let enhanced = self.enhance_stage(&transcript.stem, &first_pass).await?;

        // ENHANCED -> PUBLISHED (skipped entirely when publishing is off)
        let Some(publisher) = &self.publisher else {
            return Ok((Stage::Enhanced, enhanced, None));
        };

        let outcome = publisher
            .publish(&transcript.text, &first_pass)
            .await
            .map_err(PipelineError::Publish)?;

        Ok((Stage::Published, enhanced, Some(outcome)))
    }

    async fn extract_stage(&self, stem: &str, text: &str) -> Result<DocNotes, PipelineError> {
        let cache_path = self.notes_dir.join(format!("{stem}.json"));

        if !self.force && cache_path.exists() {
            if let Ok(notes) = read_json::<DocNotes>(&cache_path) {
                info!("Using cached first-pass notes for {}", stem);
                return Ok(notes);
            }
        }

        let notes = self
            .extractor
            .extract(text)
            .await
            .map_err(PipelineError::Extraction)?;

        write_json_atomic(&cache_path, &notes).map_err(PipelineError::Extraction)?;
        info!("Notes saved to {:?}", cache_path);

        Ok(notes)
    }

    async fn enhance_stage(
        &self,
        stem: &str,
        first_pass: &DocNotes,
    ) -> Result<EnhancedDocNotes, PipelineError> {
        let cache_path = self.enhanced_dir.join(format!("{stem}.json"));

        if !self.force && cache_path.exists() {
            if let Ok(notes) = read_json::<EnhancedDocNotes>(&cache_path) {
                info!("Using cached enhanced notes for {}", stem);
                return Ok(notes);
            }
        }

        let notes = self
            .enhancer
            .enhance(first_pass)
            .await
            .map_err(PipelineError::Enhancement)?;

        write_json_atomic(&cache_path, &notes).map_err(PipelineError::Enhancement)?;
        info!("Enhanced notes saved to {:?}", cache_path);

        Ok(notes)
    }

    /// Process a batch of files sequentially. Never aborts on a single
    /// failure; returns the tally alongside per-file outcomes.
    pub async fn process_batch(
        &self,
        paths: &[PathBuf],
        mut on_file_done: impl FnMut(&FileOutcome),
    ) -> (BatchSummary, Vec<FileOutcome>) {
        let mut outcomes = Vec::with_capacity(paths.len());
        let mut summary = BatchSummary {
            succeeded: 0,
            total: paths.len(),
        };

        for path in paths {
            let outcome = self.process_file(path).await;
            if outcome.succeeded() {
                summary.succeeded += 1;
            }
            on_file_done(&outcome);
            outcomes.push(outcome);
        }

        (summary, outcomes)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cached artifact: {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Cached artifact is not valid JSON: {:?}", path))
}

/// Collect audio files from a path that is either a single file or a
/// directory of recordings. Directory scans are shallow and sorted by name.
pub fn collect_audio_files(path: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "flac", "ogg", "opus"];

    if !path.exists() {
        return Err(PipelineError::NotFound(path.to_path_buf()));
    }

    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = std::fs::read_dir(path)
        .with_context(|| format!("Failed to read directory: {:?}", path))
        .map_err(PipelineError::Transcription)?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                    .unwrap_or(false)
        })
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{ChatMessage, GenerativeBackend, Generator};
    use crate::transcript::TranscriptStore;
    use crate::transcription::{Transcriber, TranscriptionProvider};
    use serde_json::Value;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;

    const FIRST_PASS_JSON: &str = r#"{
        "main_topic": "Recursion",
        "sub_topics": [
            {"title": "Memoization", "description": "Caching results", "examples": null}
        ],
        "assignments": [
            {"title": "Homework", "description": null, "due_date": "2026-08-28"}
        ],
        "key_takeaways": null
    }"#;

    const SECOND_PASS_JSON: &str = r#"{
        "sub_topics": [{
            "title": "Memoization",
            "description": "Caching results with tradeoffs",
            "examples": null,
            "practice_questions": ["Why cache?"],
            "definitions": null
        }],
        "key_takeaways": ["Cache what you recompute"]
    }"#;

    /// Echoes the file stem back as the transcript so stage backends can key
    /// behavior off the input file.
    struct StemEchoProvider;

    impl TranscriptionProvider for StemEchoProvider {
        fn name(&self) -> &'static str {
            "stem-echo"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn transcribe<'a>(
            &'a self,
            audio_path: &'a Path,
            _language: &'a str,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
            Box::pin(async move {
                Ok(format!(
                    "transcript of {}",
                    audio_path.file_stem().unwrap().to_string_lossy()
                ))
            })
        }
    }

    /// Answers the first pass with canned notes and the second pass with
    /// canned enhancements, failing whenever the prompt mentions the poison
    /// marker.
    struct ScriptedBackend;

    impl GenerativeBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn generate<'a>(
            &'a self,
            _model: &'a str,
            messages: &'a [ChatMessage],
            schema_name: &'a str,
            _schema: &'a Value,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
            let poisoned = messages.iter().any(|m| m.content.contains("corrupt"));
            let output = if schema_name == "doc_notes" {
                FIRST_PASS_JSON
            } else {
                SECOND_PASS_JSON
            };
            Box::pin(async move {
                if poisoned {
                    Err(anyhow::anyhow!("model refused"))
                } else {
                    Ok(output.to_string())
                }
            })
        }
    }

    fn orchestrator(root: &Path, force: bool) -> Orchestrator {
        let transcriber = Transcriber::new(Box::new(StemEchoProvider), "en".to_string());
        let store = TranscriptStore::new(root.join("transcripts"), transcriber).unwrap();
        let generator = Arc::new(Generator::new(Box::new(ScriptedBackend)));
        let extractor = NoteExtractor::new(generator.clone(), "extract-model".to_string());
        let enhancer = NoteEnhancer::new(generator, "enhance-model".to_string());

        Orchestrator::new(
            store,
            extractor,
            enhancer,
            None,
            root.join("notes"),
            root.join("enhanced_notes"),
            force,
        )
        .unwrap()
    }

    fn touch_audio(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"fake audio").unwrap();
        path
    }

    #[tokio::test]
    async fn test_process_file_persists_all_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let audio = touch_audio(tmp.path(), "lecture01.mp3");

        let orchestrator = orchestrator(tmp.path(), false);
        let outcome = orchestrator.process_file(&audio).await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.stage, Stage::Enhanced);
        assert!(tmp.path().join("transcripts/lecture01.json").exists());
        assert!(tmp.path().join("notes/lecture01.json").exists());
        assert!(tmp.path().join("enhanced_notes/lecture01.json").exists());

        let notes = outcome.notes.unwrap();
        assert_eq!(notes.main_topic, "Recursion");
        assert_eq!(notes.assignments[0].due_date, "2026-08-28");
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let files = vec![
            touch_audio(tmp.path(), "a-lecture.mp3"),
            // the stem flows into the transcript and poisons extraction
            touch_audio(tmp.path(), "corrupt-lecture.mp3"),
            touch_audio(tmp.path(), "z-lecture.mp3"),
        ];

        let orchestrator = orchestrator(tmp.path(), false);
        let (summary, outcomes) = orchestrator.process_batch(&files, |_| {}).await;

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);

        let failed: Vec<_> = outcomes.iter().filter(|o| !o.succeeded()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].stage, Stage::Failed);
        assert!(failed[0]
            .path
            .to_string_lossy()
            .contains("corrupt-lecture"));
        assert!(matches!(
            failed[0].error,
            Some(PipelineError::Extraction(_))
        ));

        // later files were still attempted
        assert!(outcomes[2].succeeded());
    }

    #[tokio::test]
    async fn test_missing_file_fails_without_model_calls() {
        let tmp = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(tmp.path(), false);

        let outcome = orchestrator
            .process_file(&tmp.path().join("ghost.mp3"))
            .await;

        assert!(!outcome.succeeded());
        assert!(matches!(outcome.error, Some(PipelineError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rerun_resumes_from_cached_notes() {
        let tmp = tempfile::tempdir().unwrap();
        let audio = touch_audio(tmp.path(), "lecture02.mp3");

        let orchestrator = orchestrator(tmp.path(), false);
        let first = orchestrator.process_file(&audio).await;
        assert!(first.succeeded());

        // Edit the cached first pass and drop the enhanced artifact. The
        // rerun must resume from the edited cache instead of re-extracting.
        let notes_path = tmp.path().join("notes/lecture02.json");
        let edited = std::fs::read_to_string(&notes_path)
            .unwrap()
            .replace("Recursion", "Edited Topic");
        std::fs::write(&notes_path, edited).unwrap();
        std::fs::remove_file(tmp.path().join("enhanced_notes/lecture02.json")).unwrap();

        let second = orchestrator.process_file(&audio).await;
        assert!(second.succeeded());
        assert_eq!(second.notes.unwrap().main_topic, "Edited Topic");
    }

    #[test]
    fn test_collect_audio_files_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        touch_audio(tmp.path(), "b.mp3");
        touch_audio(tmp.path(), "a.wav");
        std::fs::write(tmp.path().join("notes.txt"), b"not audio").unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();

        let files = collect_audio_files(tmp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.wav", "b.mp3"]);
    }

    #[test]
    fn test_collect_audio_files_single_file() {
        let tmp = tempfile::tempdir().unwrap();
        let audio = touch_audio(tmp.path(), "single.flac");
        let files = collect_audio_files(&audio).unwrap();
        assert_eq!(files, vec![audio]);
    }

    #[test]
    fn test_collect_audio_files_missing_path() {
        let err = collect_audio_files(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }
}
