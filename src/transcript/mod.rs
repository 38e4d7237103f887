//! On-disk transcript cache keyed by input file stem.
//!
//! A transcript is produced at most once per audio file; a second run for the
//! same stem reads the cached JSON and never touches the transcription
//! provider. Cache writes go to a temp file first and are renamed into place,
//! so an interrupted run cannot leave a partial cache entry behind.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::transcription::Transcriber;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub source: PathBuf,
    pub stem: String,
    pub text: String,
    /// Wall-clock seconds the provider took; absent on cache hits from
    /// older entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_secs: Option<f64>,
}

pub struct TranscriptStore {
    dir: PathBuf,
    transcriber: Transcriber,
}

/// Filename without extension; the cache and lookup key for every persisted
/// artifact of one lecture.
pub fn stem_of(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .with_context(|| format!("Path has no file stem: {:?}", path))
}

impl TranscriptStore {
    pub fn new(dir: PathBuf, transcriber: Transcriber) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create transcript directory: {:?}", dir))?;
        Ok(Self { dir, transcriber })
    }

    pub fn cache_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.json"))
    }

    /// Return the cached transcript for this audio file, or transcribe it and
    /// cache the result.
    pub async fn get_or_create(&self, audio_path: &Path) -> Result<Transcript, PipelineError> {
        if !audio_path.exists() {
            return Err(PipelineError::NotFound(audio_path.to_path_buf()));
        }

        let stem = stem_of(audio_path).map_err(PipelineError::Transcription)?;
        let cache_path = self.cache_path(&stem);

        if cache_path.exists() {
            debug!("Transcript cache hit for {}", stem);
            return read_transcript(&cache_path).map_err(PipelineError::Transcription);
        }

        let start = std::time::Instant::now();
        let text = self
            .transcriber
            .transcribe(audio_path)
            .await
            .map_err(PipelineError::Transcription)?;

        let transcript = Transcript {
            source: audio_path.to_path_buf(),
            stem,
            text,
            elapsed_secs: Some(start.elapsed().as_secs_f64()),
        };

        write_json_atomic(&cache_path, &transcript).map_err(PipelineError::Transcription)?;
        info!("Transcript saved to {:?}", cache_path);

        Ok(transcript)
    }
}

fn read_transcript(path: &Path) -> Result<Transcript> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cached transcript: {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Cached transcript is not valid JSON: {:?}", path))
}

/// Serialize `value` to `path` via a temp file in the same directory plus an
/// atomic rename. On any failure the target file is left untouched.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("Path has no parent directory: {:?}", path))?;

    let json = serde_json::to_string_pretty(value).context("Failed to serialize artifact")?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
    temp.write_all(json.as_bytes())
        .context("Failed to write artifact")?;
    temp.persist(path)
        .with_context(|| format!("Failed to persist artifact to {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::TranscriptionProvider;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl TranscriptionProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn transcribe<'a>(
            &'a self,
            _audio_path: &'a Path,
            _language: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    Err(anyhow::anyhow!("provider unavailable"))
                } else {
                    Ok("Today we covered recursion.".to_string())
                }
            })
        }
    }

    fn store_with_provider(
        dir: &Path,
        calls: Arc<AtomicUsize>,
        fail: bool,
    ) -> TranscriptStore {
        let transcriber = Transcriber::new(
            Box::new(CountingProvider { calls, fail }),
            "en".to_string(),
        );
        TranscriptStore::new(dir.to_path_buf(), transcriber).unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let audio = tmp.path().join("lecture01.mp3");
        std::fs::write(&audio, b"fake audio").unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let store = store_with_provider(tmp.path(), calls.clone(), false);

        let first = store.get_or_create(&audio).await.unwrap();
        let second = store.get_or_create(&audio).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.text, second.text);
        assert_eq!(second.stem, "lecture01");
    }

    #[tokio::test]
    async fn test_missing_audio_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let store = store_with_provider(tmp.path(), calls.clone(), false);

        let err = store
            .get_or_create(&tmp.path().join("missing.mp3"))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::NotFound(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_leaves_no_cache_file() {
        let tmp = tempfile::tempdir().unwrap();
        let audio = tmp.path().join("lecture02.mp3");
        std::fs::write(&audio, b"fake audio").unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let store = store_with_provider(tmp.path(), calls, true);

        let err = store.get_or_create(&audio).await.unwrap_err();
        assert!(matches!(err, PipelineError::Transcription(_)));
        assert!(!store.cache_path("lecture02").exists());
    }

    #[test]
    fn test_stem_of() {
        assert_eq!(stem_of(Path::new("/tmp/lec.01.mp3")).unwrap(), "lec.01");
        assert_eq!(stem_of(Path::new("talk.wav")).unwrap(), "talk");
    }
}
