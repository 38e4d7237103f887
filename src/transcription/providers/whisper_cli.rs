use anyhow::{Context, Result};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::TranscriptionProvider;

/// Local transcription through the `whisper` command-line tool.
///
/// Runs `whisper --model <m> --language <l> --output_format txt` with the
/// output directed at a temporary directory and reads back the generated
/// text file.
pub struct WhisperCliProvider {
    command_path: String,
    model: String,
    model_path: Option<String>,
}

impl WhisperCliProvider {
    pub fn new(
        command_path: Option<String>,
        model: String,
        model_path: Option<String>,
    ) -> Result<Self> {
        let command_path = match command_path {
            Some(path) => path,
            None => which::which("whisper")
                .context("whisper binary not found in PATH; set command_path in config")?
                .to_string_lossy()
                .to_string(),
        };

        info!("Initialized whisper CLI provider: {}", command_path);

        Ok(Self {
            command_path,
            model,
            model_path,
        })
    }
}

impl TranscriptionProvider for WhisperCliProvider {
    fn name(&self) -> &'static str {
        "Whisper CLI"
    }

    fn is_available(&self) -> bool {
        Path::new(&self.command_path).exists() || which::which(&self.command_path).is_ok()
    }

    fn transcribe<'a>(
        &'a self,
        audio_path: &'a Path,
        language: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            info!("Transcribing audio file via whisper CLI: {:?}", audio_path);

            let output_dir = tempfile::tempdir().context("Failed to create temp directory")?;

            let mut command = Command::new(&self.command_path);
            command
                .arg(audio_path)
                .arg("--model")
                .arg(&self.model)
                .arg("--output_format")
                .arg("txt")
                .arg("--output_dir")
                .arg(output_dir.path());

            if let Some(model_dir) = &self.model_path {
                command.arg("--model_dir").arg(model_dir);
            }

            if !language.is_empty() && language != "auto" {
                command.arg("--language").arg(language);
            }

            debug!("Running: {:?}", command);

            let output = command
                .output()
                .await
                .context("Failed to run whisper command")?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                error!("whisper CLI failed: {}", stderr);
                return Err(anyhow::anyhow!(
                    "whisper exited with {}: {}",
                    output.status,
                    stderr.trim()
                ));
            }

            // whisper writes <stem>.txt into the output directory
            let stem = audio_path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .context("Audio path has no file stem")?;
            let transcript_path = output_dir.path().join(format!("{stem}.txt"));

            let text = tokio::fs::read_to_string(&transcript_path)
                .await
                .with_context(|| {
                    format!("whisper produced no transcript at {:?}", transcript_path)
                })?;

            let text = text.trim().to_string();
            info!("Transcription complete: {} chars", text.len());

            Ok(text)
        })
    }
}
