//! Voice converter implementation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::{
    Backend, BackendError, ConvertOptions, ConvertRequest, Voice, mime_for_extension,
};

/// Errors that can occur during a conversion.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// How long a fetched voice catalog stays valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Keep the first fetch for the lifetime of the converter.
    #[default]
    Session,
    /// Refetch once the catalog is older than the given age.
    Ttl(Duration),
    /// Always refetch.
    Disabled,
}

impl CachePolicy {
    fn is_fresh(&self, fetched_at: Instant) -> bool {
        match self {
            CachePolicy::Session => true,
            CachePolicy::Ttl(ttl) => fetched_at.elapsed() < *ttl,
            CachePolicy::Disabled => false,
        }
    }
}

struct CachedCatalog {
    voices: Vec<Voice>,
    fetched_at: Instant,
}

/// Requested voice ids split against the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceSelection {
    /// Known voices, in requested order.
    pub voices: Vec<Voice>,
    /// Ids the catalog does not contain, or that are unsafe in a file name.
    pub rejected: Vec<String>,
}

/// Client for the speech-to-speech service.
pub struct VoiceConverter<B: Backend> {
    backend: B,
    cache_policy: CachePolicy,
    cache: Option<CachedCatalog>,
}

impl<B: Backend> VoiceConverter<B> {
    /// Create a new converter.
    pub fn new(backend: B, cache_policy: CachePolicy) -> Self {
        Self {
            backend,
            cache_policy,
            cache: None,
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    /// List available voices, served from cache while the policy allows.
    pub fn list_voices(&mut self) -> Result<Vec<Voice>, ConvertError> {
        if let Some(cached) = &self.cache
            && self.cache_policy.is_fresh(cached.fetched_at)
        {
            debug!(count = cached.voices.len(), "voice catalog cache hit");
            return Ok(cached.voices.clone());
        }

        let voices = self.backend.list_voices()?.voices;
        debug!(count = voices.len(), "fetched voice catalog");

        self.cache = Some(CachedCatalog {
            voices: voices.clone(),
            fetched_at: Instant::now(),
        });

        Ok(voices)
    }

    /// Drop the cached catalog so the next listing refetches.
    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    /// Split requested voice ids into catalog voices and rejected ids.
    ///
    /// Ids missing from the catalog or containing a path separator are
    /// rejected. Duplicate ids are kept once, at their first position.
    pub fn resolve_voices(&mut self, voice_ids: &[String]) -> Result<VoiceSelection, ConvertError> {
        let catalog = self.list_voices()?;
        let mut selection = VoiceSelection::default();

        for id in voice_ids {
            let seen = selection.voices.iter().any(|v| &v.voice_id == id)
                || selection.rejected.contains(id);
            if seen {
                continue;
            }
            if id.contains(['/', '\\']) {
                warn!(voice_id = %id, "voice id contains a path separator, skipping");
                selection.rejected.push(id.clone());
                continue;
            }
            match catalog.iter().find(|v| &v.voice_id == id) {
                Some(voice) => selection.voices.push(voice.clone()),
                None => {
                    warn!(voice_id = %id, "voice not in catalog, skipping");
                    selection.rejected.push(id.clone());
                }
            }
        }

        Ok(selection)
    }

    /// Convert one file, returning the number of bytes written.
    pub fn try_convert(
        &self,
        input: &Path,
        voice_id: &str,
        output: &Path,
        options: &ConvertOptions,
    ) -> Result<usize, ConvertError> {
        let audio = std::fs::read(input).map_err(|e| ConvertError::io(input, e))?;

        let file_name = input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();
        let mime_type = input
            .extension()
            .and_then(|e| e.to_str())
            .map(mime_for_extension)
            .unwrap_or("application/octet-stream");

        let request = ConvertRequest {
            voice_id: voice_id.to_string(),
            file_name,
            mime_type,
            audio,
            options: options.clone(),
        };

        let converted = self.backend.speech_to_speech(&request)?;

        write_output(output, &converted)?;

        Ok(converted.len())
    }

    /// Convert one file, logging instead of returning the failure cause.
    ///
    /// Returns `false` on any request or I/O failure; no output file is
    /// left behind unless the whole body was written.
    pub fn convert(
        &self,
        input: &Path,
        voice_id: &str,
        output: &Path,
        options: &ConvertOptions,
    ) -> bool {
        match self.try_convert(input, voice_id, output, options) {
            Ok(bytes) => {
                info!(
                    input = %input.display(),
                    output = %output.display(),
                    voice_id,
                    bytes,
                    "converted"
                );
                true
            }
            Err(e) => {
                warn!(input = %input.display(), voice_id, error = %e, "conversion failed");
                false
            }
        }
    }
}

/// Write through a temp file in the destination folder, then rename into place.
fn write_output(output: &Path, bytes: &[u8]) -> Result<(), ConvertError> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| ConvertError::io(output, e))?;
    temp.write_all(bytes).map_err(|e| ConvertError::io(output, e))?;
    temp.persist(output).map_err(|e| ConvertError::io(output, e.error))?;

    Ok(())
}
