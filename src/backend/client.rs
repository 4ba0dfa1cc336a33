//! HTTP client for the ElevenLabs API.

use reqwest::{StatusCode, Url};
use reqwest::blocking::{Response, multipart};
use tracing::debug;

use super::Backend;
use super::types::{BackendError, ConvertRequest, VoicesResponse};

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

const API_KEY_HEADER: &str = "xi-api-key";

/// HTTP-based backend client.
pub struct HttpBackend {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl HttpBackend {
    /// Create a new HTTP backend client.
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Self {
        Self::with_client(api_key, base_url, reqwest::blocking::Client::new())
    }

    /// Create a client around a preconfigured `reqwest` client.
    pub fn with_client(
        api_key: impl Into<String>,
        base_url: &str,
        client: reqwest::blocking::Client,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Get the base URL for this backend.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the voice catalog endpoint.
    pub fn voices_url(&self) -> String {
        format!("{}/v1/voices", self.base_url)
    }

    /// URL of the speech-to-speech endpoint for a voice.
    ///
    /// The voice id is percent-encoded as a single path segment.
    pub fn convert_url(&self, voice_id: &str) -> Result<Url, BackendError> {
        let invalid =
            || BackendError::RequestFailed(format!("Invalid base URL: {}", self.base_url));

        let mut url = Url::parse(&format!("{}/v1/speech-to-speech", self.base_url))
            .map_err(|_| invalid())?;
        url.path_segments_mut().map_err(|_| invalid())?.push(voice_id);
        Ok(url)
    }

    fn require_key(&self) -> Result<&str, BackendError> {
        if self.api_key.trim().is_empty() {
            return Err(BackendError::Authentication("API key is empty".to_string()));
        }
        Ok(&self.api_key)
    }

    /// Turn a non-2xx response into an error, passing successful ones through.
    fn check(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(status_error(status, body))
    }
}

/// Map a failed HTTP status onto the error taxonomy.
pub(crate) fn status_error(status: StatusCode, body: String) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            BackendError::Authentication(format!("{status}: {body}"))
        }
        _ => BackendError::Service {
            status: status.as_u16(),
            body,
        },
    }
}

impl Backend for HttpBackend {
    fn list_voices(&self) -> Result<VoicesResponse, BackendError> {
        let key = self.require_key()?;
        let url = self.voices_url();
        debug!(%url, "fetching voice catalog");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, key)
            .send()
            .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?;

        Self::check(response)?
            .json()
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    fn speech_to_speech(&self, request: &ConvertRequest) -> Result<Vec<u8>, BackendError> {
        let key = self.require_key()?;
        let url = self.convert_url(&request.voice_id)?;
        debug!(
            %url,
            file = %request.file_name,
            bytes = request.audio.len(),
            "uploading audio for conversion"
        );

        let file_part = multipart::Part::bytes(request.audio.clone())
            .file_name(request.file_name.clone())
            .mime_str(request.mime_type)
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        let form = multipart::Form::new().part("audio", file_part);

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, key)
            .query(&request.options.query_params())
            .multipart(form)
            .send()
            .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?;

        Self::check(response)?
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}
