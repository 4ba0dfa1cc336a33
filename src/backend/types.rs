//! Backend request/response types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::OutputFormat;

/// Default speech-to-speech model.
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_sts_v2";

/// Errors that can occur when communicating with the conversion API.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Service error (HTTP {status}): {body}")]
    Service { status: u16, body: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A voice audio can be converted to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Voice {
    pub voice_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Voice {
    /// Create a voice with only the required fields set.
    pub fn new(voice_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            voice_id: voice_id.into(),
            name: name.into(),
            category: None,
            description: None,
        }
    }
}

/// Response from the list voices endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicesResponse {
    pub voices: Vec<Voice>,
}

/// Per-conversion settings sent as query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub model_id: String,
    pub output_format: OutputFormat,
    pub remove_background_noise: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            output_format: OutputFormat::default(),
            remove_background_noise: false,
        }
    }
}

impl ConvertOptions {
    /// Set the model id.
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Enable or disable background noise removal.
    pub fn with_noise_removal(mut self, enabled: bool) -> Self {
        self.remove_background_noise = enabled;
        self
    }

    /// Query parameters for the speech-to-speech endpoint.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("model_id", self.model_id.clone()),
            ("output_format", self.output_format.as_str().to_string()),
            (
                "remove_background_noise",
                self.remove_background_noise.to_string(),
            ),
        ]
    }
}

/// A single speech-to-speech upload.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub voice_id: String,
    pub file_name: String,
    pub mime_type: &'static str,
    pub audio: Vec<u8>,
    pub options: ConvertOptions,
}

/// Guess the upload MIME type from a file extension.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "ogg" => "audio/ogg",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}
