//! CLI handler for the `process` command.
//!
//! Wires config and flags into the pipeline, runs a single file or a batch,
//! and renders the finished notes. Single-file mode reflects failure in the
//! process exit code; directory mode prints a tally and never aborts the
//! whole run over one bad file.

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

use crate::cli::args::{OutputFormat, ProcessCliArgs};
use crate::config::Config;
use crate::generation::{BackendConfig, Generator};
use crate::global;
use crate::notes::EnhancedDocNotes;
use crate::pipeline::{collect_audio_files, NoteEnhancer, NoteExtractor, Orchestrator};
use crate::publish::Publisher;
use crate::transcript::TranscriptStore;
use crate::transcription::{ProviderConfig, Transcriber};

pub async fn handle_process_command(args: ProcessCliArgs) -> Result<()> {
    let mut config = Config::load()?;
    apply_overrides(&mut config, &args);

    let orchestrator = build_orchestrator(&config, &args)?;

    let files = collect_audio_files(&args.path)?;
    if files.is_empty() {
        bail!("No audio files found in {:?}", args.path);
    }

    if files.len() == 1 && args.path.is_file() {
        // single-file mode: failure becomes the exit code
        let outcome = orchestrator.process_file(&files[0]).await;
        match outcome.error {
            Some(e) => Err(e.into()),
            None => {
                if let Some(notes) = &outcome.notes {
                    render_notes(notes, args.format)?;
                }
                if let Some(publish) = &outcome.publish {
                    eprintln!(
                        "Published: doc {} / sheet {}",
                        publish.doc_id, publish.sheet_id
                    );
                }
                Ok(())
            }
        }
    } else {
        // directory mode: keep going, report the tally
        let pb = create_progress_bar(files.len() as u64);

        let (summary, outcomes) = orchestrator
            .process_batch(&files, |outcome| {
                pb.inc(1);
                if let Some(e) = &outcome.error {
                    pb.println(format!("FAILED {:?}: {}", outcome.path, e));
                }
            })
            .await;

        pb.finish_and_clear();

        if args.format != OutputFormat::Console {
            for outcome in &outcomes {
                if let Some(notes) = &outcome.notes {
                    println!("{}", serde_json::to_string_pretty(notes)?);
                }
            }
        }

        println!("Processed {}/{} recording(s)", summary.succeeded, summary.total);
        Ok(())
    }
}

fn apply_overrides(config: &mut Config, args: &ProcessCliArgs) {
    if let Some(model) = &args.model {
        config.model.extract_model = Some(model.clone());
    }
    if let Some(model) = &args.enhance_model {
        config.model.enhance_model = Some(model.clone());
    }
    if let Some(model) = &args.whisper_model {
        config.whisper.model = Some(model.clone());
    }
    if let Some(language) = &args.language {
        config.whisper.language = Some(language.clone());
    }
    if args.no_publish {
        config.publish.enabled = false;
    }
}

fn build_orchestrator(config: &Config, args: &ProcessCliArgs) -> Result<Orchestrator> {
    let provider_name = config
        .whisper
        .provider
        .as_deref()
        .context("No transcription provider configured")?;
    let transcriber =
        Transcriber::with_provider(provider_name, ProviderConfig::from(&config.whisper))?;
    let store = TranscriptStore::new(global::transcripts_dir()?, transcriber)?;

    let backend_name = config
        .model
        .backend
        .as_deref()
        .context("No generation backend configured")?;
    let generator = Arc::new(Generator::with_backend(
        backend_name,
        BackendConfig {
            api_key: config.model.api_key.clone(),
            api_endpoint: config.model.api_endpoint.clone(),
        },
    )?);

    let extract_model = config
        .model
        .extract_model
        .clone()
        .context("No extraction model configured")?;
    let enhance_model = config
        .model
        .enhance_model
        .clone()
        .unwrap_or_else(|| extract_model.clone());

    let extractor = NoteExtractor::new(generator.clone(), extract_model);
    let enhancer = NoteEnhancer::new(generator, enhance_model);

    let publisher = if config.publish.enabled {
        Some(Publisher::from_config(&config.publish)?)
    } else {
        None
    };

    Orchestrator::new(
        store,
        extractor,
        enhancer,
        publisher,
        global::notes_dir()?,
        global::enhanced_notes_dir()?,
        args.force,
    )
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("━╸━"),
    );
    pb
}

fn render_notes(notes: &EnhancedDocNotes, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Console => println!("{}", format_console(notes)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(notes)?),
        OutputFormat::Both => {
            println!("{}", format_console(notes));
            println!("{}", serde_json::to_string_pretty(notes)?);
        }
    }
    Ok(())
}

fn format_console(notes: &EnhancedDocNotes) -> String {
    let mut out = format!("# {}\n", notes.main_topic);

    for subtopic in &notes.sub_topics {
        out.push_str(&format!("\n## {}\n{}\n", subtopic.title, subtopic.description));

        if let Some(examples) = &subtopic.examples {
            for example in examples {
                out.push_str(&format!("  e.g. {}\n", example));
            }
        }
        if let Some(questions) = &subtopic.practice_questions {
            out.push_str("  Practice:\n");
            for question in questions {
                out.push_str(&format!("   - {}\n", question));
            }
        }
        if let Some(definitions) = &subtopic.definitions {
            out.push_str("  Definitions:\n");
            for definition in definitions {
                out.push_str(&format!("   - {}\n", definition));
            }
        }
    }

    if !notes.assignments.is_empty() {
        out.push_str("\n## Assignments\n");
        for assignment in &notes.assignments {
            let description = assignment
                .description
                .as_deref()
                .map(|d| format!(" - {}", d))
                .unwrap_or_default();
            out.push_str(&format!(
                " - {} (due {}){}\n",
                assignment.title, assignment.due_date, description
            ));
        }
    }

    if let Some(takeaways) = &notes.key_takeaways {
        if !takeaways.is_empty() {
            out.push_str("\n## Key takeaways\n");
            for takeaway in takeaways {
                out.push_str(&format!(" - {}\n", takeaway));
            }
        }
    }

    out
}
