pub mod args;
pub mod process;
pub mod provider;

pub use args::{Cli, CliCommand, OutputFormat, ProcessCliArgs, ProviderCliArgs, ProviderCommand};
pub use process::handle_process_command;
pub use provider::handle_provider_command;
