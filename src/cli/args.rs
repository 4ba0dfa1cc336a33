//! CLI argument definitions and parsing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

/// Batch speech-to-speech voice conversion.
#[derive(Parser, Debug)]
#[command(name = "voice-converter-rs")]
#[command(about = "Convert folders of voice recordings to other voices via ElevenLabs")]
#[command(version)]
pub struct Args {
    /// Folder of audio files to convert (non-recursive)
    #[arg(short, long, conflicts_with = "file")]
    pub input: Option<PathBuf>,

    /// Individual audio file to convert (repeatable)
    #[arg(short, long)]
    pub file: Vec<PathBuf>,

    /// Output folder for converted files
    #[arg(short, long, default_value = "converted")]
    pub output: PathBuf,

    /// Target voice IDs, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub voices: Vec<String>,

    /// Speech-to-speech model
    #[arg(long, default_value = "eleven_multilingual_sts_v2")]
    pub model_id: String,

    /// Output audio format
    #[arg(long, value_enum, default_value = "mp3_44100_128")]
    pub format: OutputFormat,

    /// Remove background noise before conversion
    #[arg(long)]
    pub remove_noise: bool,

    /// Delay between conversion requests in milliseconds
    #[arg(long, default_value = "100")]
    pub delay_ms: u64,

    /// Audio extensions to pick up from the input folder, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// List available voices and exit
    #[arg(long)]
    pub list_voices: bool,

    /// API host (overrides ELEVENLABS_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key (overrides ELEVENLABS_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the batch summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    ListVoices,
    Folder(PathBuf),
    Files(Vec<PathBuf>),
}

/// Errors from an invocation that parses but cannot run.
#[derive(Error, Debug)]
pub enum ArgsError {
    #[error("No input given. Use -i <folder> or -f <file>, or --list-voices")]
    NoInput,

    #[error("No voice IDs given. Use --voices id1,id2")]
    NoVoices,
}

impl Args {
    /// Voice IDs with whitespace trimmed and empty entries dropped.
    pub fn voice_ids(&self) -> Vec<String> {
        self.voices
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Resolve the flags into a single mode of operation.
    pub fn mode(&self) -> Result<Mode, ArgsError> {
        if self.list_voices {
            return Ok(Mode::ListVoices);
        }

        let mode = match (&self.input, self.file.is_empty()) {
            (Some(folder), _) => Mode::Folder(folder.clone()),
            (None, false) => Mode::Files(self.file.clone()),
            (None, true) => return Err(ArgsError::NoInput),
        };

        if self.voice_ids().is_empty() {
            return Err(ArgsError::NoVoices);
        }

        Ok(mode)
    }
}

/// Output audio format accepted by the speech-to-speech endpoint.
#[allow(non_camel_case_types)]
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[value(name = "mp3_22050_32")]
    Mp3_22050_32,

    #[value(name = "mp3_44100_64")]
    Mp3_44100_64,

    #[value(name = "mp3_44100_96")]
    Mp3_44100_96,

    #[default]
    #[value(name = "mp3_44100_128")]
    Mp3_44100_128,

    /// Requires a Creator tier subscription or above
    #[value(name = "mp3_44100_192")]
    Mp3_44100_192,

    #[value(name = "pcm_16000")]
    Pcm_16000,

    #[value(name = "pcm_22050")]
    Pcm_22050,

    #[value(name = "pcm_24000")]
    Pcm_24000,

    #[value(name = "pcm_44100")]
    Pcm_44100,

    #[value(name = "ulaw_8000")]
    Ulaw_8000,
}

impl OutputFormat {
    /// Returns the API parameter string for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Mp3_22050_32 => "mp3_22050_32",
            OutputFormat::Mp3_44100_64 => "mp3_44100_64",
            OutputFormat::Mp3_44100_96 => "mp3_44100_96",
            OutputFormat::Mp3_44100_128 => "mp3_44100_128",
            OutputFormat::Mp3_44100_192 => "mp3_44100_192",
            OutputFormat::Pcm_16000 => "pcm_16000",
            OutputFormat::Pcm_22050 => "pcm_22050",
            OutputFormat::Pcm_24000 => "pcm_24000",
            OutputFormat::Pcm_44100 => "pcm_44100",
            OutputFormat::Ulaw_8000 => "ulaw_8000",
        }
    }
}
