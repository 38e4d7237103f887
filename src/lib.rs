pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod global;
pub mod notes;
pub mod pipeline;
pub mod publish;
pub mod transcript;
pub mod transcription;
