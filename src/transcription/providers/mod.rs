use anyhow::Result;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

pub mod openai_api;
pub mod whisper_cli;

pub use openai_api::OpenAIProvider;
pub use whisper_cli::WhisperCliProvider;

pub trait TranscriptionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    fn transcribe<'a>(
        &'a self,
        audio_path: &'a Path,
        language: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}
