//! CLI handler for transcription provider management.
//!
//! Terminal presentation only; provider validation lives in the
//! `transcription` module.

use crate::cli::args::{ProviderCliArgs, ProviderCommand};
use crate::config::Config;
use crate::transcription::{
    get_provider_status_from_config, ProviderConfig, ProviderStatus, Transcriber,
};
use anyhow::{anyhow, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use which::which;

pub async fn handle_provider_command(args: ProviderCliArgs) -> Result<()> {
    match args.command {
        ProviderCommand::Show => handle_show(),
        ProviderCommand::Configure => handle_configure(),
        ProviderCommand::Test { file } => handle_test(file).await,
    }
}

fn handle_show() -> Result<()> {
    let config = Config::load()?;
    let whisper = &config.whisper;
    let status = get_provider_status_from_config(whisper)?;

    println!();
    println!("Provider Configuration");
    println!("======================");
    println!();
    println!(
        "Provider:     {}",
        whisper.provider.as_deref().unwrap_or("<not set>")
    );
    println!(
        "Model:        {}",
        whisper.model.as_deref().unwrap_or("<default>")
    );
    println!(
        "Language:     {}",
        whisper.language.as_deref().unwrap_or("<default>")
    );
    println!("API Key:      {}", mask_secret(&whisper.api_key));
    println!("Endpoint:     {}", display_value(&whisper.api_endpoint));
    println!("Command path: {}", display_value(&whisper.command_path));
    println!("Model path:   {}", display_value(&whisper.model_path));
    println!();
    println!("Status:       {}", provider_status_display(&status));
    println!("Config file:  {}", crate::global::config_file()?.display());

    Ok(())
}

fn handle_configure() -> Result<()> {
    if !io::stdin().is_terminal() {
        info!("Non-interactive session. Edit the config file manually to change providers.");
        return Ok(());
    }

    let theme = ColorfulTheme::default();
    let mut config = Config::load()?;

    println!();
    println!("Provider Configuration");
    println!("======================");
    println!();
    println!(
        "Current provider: {}",
        config.whisper.provider.as_deref().unwrap_or("<not set>")
    );
    println!();

    const OPTIONS: &[(&str, &str)] = &[
        ("openai-api", "OpenAI Whisper API (requires API key)"),
        ("whisper-cli", "Local whisper CLI (requires local install)"),
    ];

    let items: Vec<String> = OPTIONS
        .iter()
        .map(|(name, desc)| format!("{:<12} - {}", name, desc))
        .collect();

    let default_index = config
        .whisper
        .provider
        .as_deref()
        .and_then(|value| OPTIONS.iter().position(|(name, _)| *name == value))
        .unwrap_or(0);

    let selection = Select::with_theme(&theme)
        .with_prompt("Select a transcription provider")
        .items(&items)
        .default(default_index)
        .interact()?;

    let provider = OPTIONS[selection].0;
    config.whisper.provider = Some(provider.to_string());

    match provider {
        "openai-api" => {
            config.whisper.command_path = None;

            let api_key = prompt_secret(&theme, "OpenAI API key (sk-...)", &config.whisper.api_key)?;
            config.whisper.api_key = Some(api_key);

            let model_default = config
                .whisper
                .model
                .clone()
                .unwrap_or_else(|| "whisper-1".to_string());
            config.whisper.model =
                Some(prompt_string_with_default(&theme, "Model", &model_default)?);
        }
        _ => {
            config.whisper.api_key = None;
            config.whisper.api_endpoint = None;

            let default_path = config
                .whisper
                .command_path
                .clone()
                .or_else(|| which("whisper").ok().map(|p| p.to_string_lossy().to_string()))
                .unwrap_or_default();
            let command_path = prompt_string_with_default(
                &theme,
                "Path to `whisper` CLI binary",
                &default_path,
            )?;
            config.whisper.command_path = Some(command_path);

            let model_default = config
                .whisper
                .model
                .clone()
                .unwrap_or_else(|| "base".to_string());
            config.whisper.model = Some(prompt_string_with_default(
                &theme,
                "Model (tiny, base, small, medium, large-v3, ...)",
                &model_default,
            )?);
        }
    }

    let language_default = config
        .whisper
        .language
        .clone()
        .unwrap_or_else(|| "en".to_string());
    config.whisper.language = Some(prompt_string_with_default(
        &theme,
        "Language code (ISO 639-1, e.g. en, es, auto)",
        &language_default,
    )?);

    let proceed = Confirm::with_theme(&theme)
        .with_prompt("Save these changes?")
        .default(true)
        .interact()?;

    if !proceed {
        println!("Configuration cancelled.");
        return Ok(());
    }

    config.save()?;
    println!();
    println!("Provider updated to '{}'.", provider);
    println!("Run `lectern provider test` to verify it works.");

    Ok(())
}

async fn handle_test(file: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let provider_name = config.whisper.provider.as_deref().ok_or_else(|| {
        anyhow!("No transcription provider configured. Run `lectern provider configure` first.")
    })?;

    println!();
    println!("Provider Test");
    println!("=============");
    println!();
    println!("Provider: {}", provider_name);

    print!("Initializing... ");
    let transcriber =
        Transcriber::with_provider(provider_name, ProviderConfig::from(&config.whisper))?;
    println!("OK");

    if let Some(audio_path) = file {
        if !audio_path.exists() {
            return Err(anyhow!("Audio file not found: {}", audio_path.display()));
        }

        println!("Audio file: {}", audio_path.display());
        print!("Transcribing... ");

        let start = Instant::now();
        let result = transcriber.transcribe(&audio_path).await?;
        println!("done ({:.2}s)", start.elapsed().as_secs_f64());

        println!();
        println!("Result:");
        println!("  \"{}\"", result);
    } else {
        println!();
        println!("Provider '{}' initialized successfully.", provider_name);
        println!("To test with actual audio: lectern provider test --file <audio.wav>");
    }

    Ok(())
}

fn provider_status_display(status: &ProviderStatus) -> &'static str {
    match status {
        ProviderStatus::Ready { .. } => "Ready",
        ProviderStatus::ConfigError { .. } => "Configuration error",
        ProviderStatus::NotConfigured => "Not configured",
    }
}

fn prompt_secret(
    theme: &ColorfulTheme,
    prompt: &str,
    current: &Option<String>,
) -> Result<String> {
    if let Some(existing) = current {
        let keep = Confirm::with_theme(theme)
            .with_prompt(format!("Keep existing {}?", prompt))
            .default(true)
            .interact()?;
        if keep {
            return Ok(existing.clone());
        }
    }

    loop {
        let value = Password::new().with_prompt(prompt).interact()?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            println!("{} cannot be empty.", prompt);
            continue;
        }
        return Ok(trimmed.to_string());
    }
}

fn prompt_string_with_default(theme: &ColorfulTheme, label: &str, current: &str) -> Result<String> {
    let prompt = format!("{label} [{current}]");
    let value: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    let trimmed = value.trim();
    if trimmed.is_empty() {
        Ok(current.to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(secret) if secret.len() > 8 => {
            let prefix = &secret[..4];
            let suffix = &secret[secret.len() - 2..];
            format!("{prefix}****{suffix}")
        }
        Some(secret) if !secret.is_empty() => "*".repeat(secret.len()),
        _ => "<not set>".to_string(),
    }
}
