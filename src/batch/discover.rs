//! Input discovery and output naming.

use std::path::{Path, PathBuf};

use super::BatchError;

/// Extensions picked up when none are configured.
pub const DEFAULT_EXTENSIONS: [&str; 6] = ["mp3", "wav", "m4a", "flac", "aac", "ogg"];

/// Lowercase and strip leading dots; falls back to the defaults when empty.
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    let normalized: Vec<String> = extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    if normalized.is_empty() {
        return DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();
    }
    normalized
}

/// List audio files directly inside `folder` whose extension is allowed.
///
/// Matching is case-insensitive and non-recursive. Results are sorted by
/// file name.
pub fn discover(folder: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, BatchError> {
    if !folder.is_dir() {
        return Err(BatchError::InputNotFound(folder.to_path_buf()));
    }

    let allowed = normalize_extensions(extensions);
    let read_err = |source| BatchError::ReadDir {
        path: folder.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if !path.is_file() {
            continue;
        }

        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)));

        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Replace path separators so a name can't escape the output folder.
fn sanitize(part: &str) -> String {
    part.replace(['/', '\\'], "_")
}

/// Build `{stem}_{voice_name}_{voice_id}{ext}`; `ext` carries its own dot.
///
/// Only the display name is sanitized. The voice id is used verbatim so
/// distinct ids always give distinct names; ids with path separators are
/// rejected before conversion.
pub fn output_file_name(stem: &str, voice_name: &str, voice_id: &str, ext: &str) -> String {
    format!("{stem}_{}_{voice_id}{ext}", sanitize(voice_name))
}
