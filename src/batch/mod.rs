//! Batch conversion of a folder of recordings into several voices.
//!
//! Discovery picks up audio files by extension, and the runner walks the
//! cross-product of files and target voices, collecting per-file outcomes.

mod discover;
mod runner;

use std::path::PathBuf;

use thiserror::Error;

use crate::converter::ConvertError;

pub use discover::{DEFAULT_EXTENSIONS, discover, normalize_extensions, output_file_name};
pub use runner::{BatchRunner, ConversionResult, Pacing};

/// Errors that abort a whole batch run.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input folder not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to read folder {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create output folder {}: {source}", path.display())]
    OutputFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load voice catalog: {0}")]
    Catalog(#[from] ConvertError),

    #[error("No valid voice IDs provided (rejected: {0:?})")]
    NoValidVoices(Vec<String>),
}
