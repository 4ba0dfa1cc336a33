//! voice-converter-rs CLI entry point.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;
use voice_converter_rs::backend::{Backend, ConvertOptions, create_backend};
use voice_converter_rs::batch::{BatchRunner, ConversionResult, Pacing};
use voice_converter_rs::cli::{Args, Mode};
use voice_converter_rs::config::Config;
use voice_converter_rs::converter::{CachePolicy, VoiceConverter};

fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    init_logging(args.verbose);

    let mode = args.mode()?;

    let config = Config::from_env(args.api_key.clone(), args.base_url.clone())?;
    let backend = create_backend(&config.api_key, &config.base_url);
    let converter = VoiceConverter::new(backend, CachePolicy::Session);

    let options = ConvertOptions::default()
        .with_model(args.model_id.clone())
        .with_format(args.format)
        .with_noise_removal(args.remove_noise);

    let mut runner = BatchRunner::new(converter, options)
        .with_pacing(Pacing::fixed(Duration::from_millis(args.delay_ms)))
        .with_extensions(&args.extensions);

    let voice_ids = args.voice_ids();

    let result = match mode {
        Mode::ListVoices => return list_voices(runner.converter_mut()),
        Mode::Folder(folder) => {
            println!("Input folder: {}", folder.display());
            println!("Target voices: {}", voice_ids.join(", "));
            runner
                .run(&folder, &args.output, &voice_ids)
                .context("Batch conversion failed")?
        }
        Mode::Files(files) => {
            println!("Converting {} file(s)", files.len());
            println!("Target voices: {}", voice_ids.join(", "));
            runner
                .run_files(&files, &args.output, &voice_ids)
                .context("Conversion failed")?
        }
    };

    print_summary(&result, &args.output, args.json)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn list_voices<B: Backend>(converter: &mut VoiceConverter<B>) -> Result<()> {
    let voices = converter.list_voices().context("Failed to list voices")?;

    if voices.is_empty() {
        println!("No voices found.");
        return Ok(());
    }

    println!("Available voices ({} total):", voices.len());
    for (i, voice) in voices.iter().enumerate() {
        println!("{:2}. {} (ID: {})", i + 1, voice.name, voice.voice_id);
        if let Some(category) = &voice.category {
            println!("    Category: {category}");
        }
        if let Some(description) = voice.description.as_deref().filter(|d| !d.is_empty()) {
            println!("    Description: {description}");
        }
    }

    Ok(())
}

fn print_summary(result: &ConversionResult, output: &Path, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(result).context("Failed to serialize summary")?;
        println!("{text}");
        return Ok(());
    }

    if !result.rejected_voices.is_empty() {
        println!("Skipped unknown voice IDs: {}", result.rejected_voices.join(", "));
    }

    println!("Conversion complete!");
    println!("  Successfully converted: {} files", result.success.len());
    println!("  Failed conversions: {}", result.failed.len());
    println!("  Written to: {}", output.display());

    if !result.failed.is_empty() {
        println!("Failed conversions:");
        for failed in &result.failed {
            println!("  - {failed}");
        }
    }

    Ok(())
}
