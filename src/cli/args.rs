use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(about = "Turn lecture recordings into structured study notes", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Transcribe, extract and enhance notes for a recording or a directory
    Process(ProcessCliArgs),
    /// Inspect or configure transcription providers
    Provider(ProviderCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct ProcessCliArgs {
    /// Audio file or directory of recordings
    pub path: PathBuf,

    /// Model for the first (extraction) pass
    #[arg(long)]
    pub model: Option<String>,

    /// Model for the second (enhancement) pass
    #[arg(long)]
    pub enhance_model: Option<String>,

    /// Whisper model variant for transcription
    #[arg(long)]
    pub whisper_model: Option<String>,

    /// Language hint for transcription (ISO 639-1)
    #[arg(long)]
    pub language: Option<String>,

    /// Where to show the finished notes
    #[arg(long, value_enum, default_value = "console")]
    pub format: OutputFormat,

    /// Skip the Google Docs/Sheets export even if configured
    #[arg(long)]
    pub no_publish: bool,

    /// Ignore cached transcripts and notes, redo every stage
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Console,
    Json,
    Both,
}

#[derive(ClapArgs, Debug)]
pub struct ProviderCliArgs {
    #[command(subcommand)]
    pub command: ProviderCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProviderCommand {
    /// Show the current transcription provider configuration
    Show,
    /// Run the interactive provider configuration wizard
    Configure,
    /// Validate the configured provider, optionally against a real file
    Test {
        /// Audio file to transcribe as a smoke test
        #[arg(long)]
        file: Option<PathBuf>,
    },
}
