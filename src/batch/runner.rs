//! Batch runner over files × voices.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::backend::{Backend, ConvertOptions};
use crate::converter::VoiceConverter;

use super::BatchError;
use super::discover::{discover, normalize_extensions, output_file_name};

/// Fixed delay inserted between conversion requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub delay: Duration,
}

impl Pacing {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

    pub fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    fn pause(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::fixed(Self::DEFAULT_DELAY)
    }
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    /// Input file names whose every voice conversion succeeded.
    pub success: Vec<String>,
    /// `"{file} -> {voice_name}"` for each failed pair.
    pub failed: Vec<String>,
    /// Output files written, in call order.
    pub outputs: Vec<PathBuf>,
    /// Requested voice ids missing from the catalog.
    pub rejected_voices: Vec<String>,
}

/// Applies a converter across every (file, voice) pair.
pub struct BatchRunner<B: Backend> {
    converter: VoiceConverter<B>,
    options: ConvertOptions,
    pacing: Pacing,
    extensions: Vec<String>,
}

impl<B: Backend> BatchRunner<B> {
    /// Create a runner with default pacing and extensions.
    pub fn new(converter: VoiceConverter<B>, options: ConvertOptions) -> Self {
        Self {
            converter,
            options,
            pacing: Pacing::default(),
            extensions: normalize_extensions(&[]),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = normalize_extensions(extensions);
        self
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn converter_mut(&mut self) -> &mut VoiceConverter<B> {
        &mut self.converter
    }

    /// Convert every matching file in `input_folder` to every voice.
    pub fn run(
        &mut self,
        input_folder: &Path,
        output_folder: &Path,
        voice_ids: &[String],
    ) -> Result<ConversionResult, BatchError> {
        let files = discover(input_folder, &self.extensions)?;

        if files.is_empty() {
            info!(folder = %input_folder.display(), "no audio files found");
            return Ok(ConversionResult::default());
        }

        self.run_files(&files, output_folder, voice_ids)
    }

    /// Convert an explicit list of files to every voice.
    ///
    /// Iterates file-major, voice-minor. A failed pair is recorded and the
    /// run moves on; only folder or catalog problems abort.
    pub fn run_files(
        &mut self,
        files: &[PathBuf],
        output_folder: &Path,
        voice_ids: &[String],
    ) -> Result<ConversionResult, BatchError> {
        std::fs::create_dir_all(output_folder).map_err(|source| BatchError::OutputFolder {
            path: output_folder.to_path_buf(),
            source,
        })?;

        let selection = self.converter.resolve_voices(voice_ids)?;
        if selection.voices.is_empty() {
            return Err(BatchError::NoValidVoices(selection.rejected));
        }

        info!(
            files = files.len(),
            voices = selection.voices.len(),
            "starting batch conversion"
        );

        let mut result = ConversionResult {
            rejected_voices: selection.rejected,
            ..Default::default()
        };
        let mut calls = 0usize;

        for file in files {
            let display_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let ext = file
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();

            let mut file_ok = true;

            for voice in &selection.voices {
                if calls > 0 {
                    self.pacing.pause();
                }
                calls += 1;

                let output = output_folder.join(output_file_name(
                    &stem,
                    &voice.name,
                    &voice.voice_id,
                    &ext,
                ));

                if self
                    .converter
                    .convert(file, &voice.voice_id, &output, &self.options)
                {
                    result.outputs.push(output);
                } else {
                    file_ok = false;
                    result.failed.push(format!("{display_name} -> {}", voice.name));
                }
            }

            if file_ok {
                result.success.push(display_name);
            }
        }

        if !result.failed.is_empty() {
            warn!(failed = result.failed.len(), "some conversions failed");
        }
        info!(
            succeeded = result.success.len(),
            failed = result.failed.len(),
            "batch complete"
        );

        Ok(result)
    }
}
