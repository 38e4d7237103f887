use anyhow::Result;
use clap::Parser;
use lectern::cli::{handle_process_command, handle_provider_command, Cli, CliCommand};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        CliCommand::Version => {
            println!("Lectern {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliCommand::Provider(args) => handle_provider_command(args).await,
        CliCommand::Process(args) => handle_process_command(args).await,
    }
}
