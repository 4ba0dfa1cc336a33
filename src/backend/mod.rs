//! Backend communication with the speech-to-speech API.
//!
//! Provides the trait the converter talks through and the HTTP
//! implementation that calls the remote service.

mod client;
mod types;

pub use client::{DEFAULT_BASE_URL, HttpBackend};
pub use types::{
    BackendError, ConvertOptions, ConvertRequest, DEFAULT_MODEL_ID, Voice, VoicesResponse,
    mime_for_extension,
};

/// Trait for conversion API communication.
///
/// This trait abstracts the HTTP communication with the remote service,
/// allowing for mock implementations in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Backend: Send + Sync {
    /// Fetch the voice catalog.
    fn list_voices(&self) -> Result<VoicesResponse, BackendError>;

    /// Convert uploaded audio to the requested voice.
    ///
    /// # Returns
    /// Raw audio bytes in the requested output format
    fn speech_to_speech(&self, request: &ConvertRequest) -> Result<Vec<u8>, BackendError>;
}

/// Create a backend for the given credentials and host.
pub fn create_backend(api_key: &str, base_url: &str) -> HttpBackend {
    HttpBackend::new(api_key, base_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    /// Serve one canned HTTP response on loopback and hand back the raw request.
    fn serve_once(status_line: &'static str, body: &'static [u8]) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            while !request_complete(&request) {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let head = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(body).unwrap();
            stream.flush().unwrap();

            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }

    fn loopback_backend(api_key: &str, base_url: &str) -> HttpBackend {
        let client = reqwest::blocking::Client::builder().no_proxy().build().unwrap();
        HttpBackend::with_client(api_key, base_url, client)
    }

    fn request_complete(request: &[u8]) -> bool {
        let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
        let body_len = request.len() - header_end - 4;

        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok());

        match content_length {
            Some(len) => body_len >= len,
            None if head.contains("transfer-encoding: chunked") => request.ends_with(b"0\r\n\r\n"),
            None => true,
        }
    }

    // ===========================================
    // Backend trait tests with mocks
    // ===========================================

    #[test]
    fn test_mock_backend_list_voices() {
        let mut mock = MockBackend::new();

        mock.expect_list_voices().times(1).returning(|| {
            Ok(VoicesResponse {
                voices: vec![Voice::new("id1", "Rachel"), Voice::new("id2", "Adam")],
            })
        });

        let voices = mock.list_voices().unwrap();
        assert_eq!(voices.voices.len(), 2);
        assert_eq!(voices.voices[0].name, "Rachel");
    }

    #[test]
    fn test_mock_backend_speech_to_speech() {
        let mut mock = MockBackend::new();

        mock.expect_speech_to_speech()
            .withf(|req| req.voice_id == "id1" && req.file_name == "clip.mp3")
            .times(1)
            .returning(|_| Ok(b"ID3 converted".to_vec()));

        let request = ConvertRequest {
            voice_id: "id1".to_string(),
            file_name: "clip.mp3".to_string(),
            mime_type: "audio/mpeg",
            audio: b"ID3 original".to_vec(),
            options: ConvertOptions::default(),
        };

        let audio = mock.speech_to_speech(&request).unwrap();
        assert!(audio.starts_with(b"ID3"));
    }

    // ===========================================
    // HttpBackend tests
    // ===========================================

    #[test]
    fn test_create_backend_default_host() {
        let backend = create_backend("key", DEFAULT_BASE_URL);
        assert_eq!(backend.base_url(), "https://api.elevenlabs.io");
        assert_eq!(backend.voices_url(), "https://api.elevenlabs.io/v1/voices");
    }

    #[test]
    fn test_create_backend_trims_trailing_slash() {
        let backend = create_backend("key", "http://localhost:8080/");
        assert_eq!(
            backend.convert_url("abc").unwrap().as_str(),
            "http://localhost:8080/v1/speech-to-speech/abc"
        );
    }

    #[test]
    fn test_convert_url_encodes_voice_id() {
        let backend = create_backend("key", DEFAULT_BASE_URL);

        let slashed = backend.convert_url("a/b").unwrap();
        let underscored = backend.convert_url("a_b").unwrap();

        assert_eq!(slashed.as_str(), "https://api.elevenlabs.io/v1/speech-to-speech/a%2Fb");
        assert_ne!(slashed, underscored);
    }

    #[test]
    fn test_empty_key_is_authentication_error() {
        let backend = create_backend("  ", "http://127.0.0.1:9");
        let result = backend.list_voices();
        assert!(matches!(result, Err(BackendError::Authentication(_))));
    }

    #[test]
    fn test_speech_to_speech_sends_upload() {
        let (base_url, server) = serve_once("200 OK", b"converted bytes");
        let backend = loopback_backend("sk_test", &base_url);

        let request = ConvertRequest {
            voice_id: "id1".to_string(),
            file_name: "clip.mp3".to_string(),
            mime_type: "audio/mpeg",
            audio: b"ID3 source audio".to_vec(),
            options: ConvertOptions::default().with_noise_removal(true),
        };

        let audio = backend.speech_to_speech(&request).unwrap();
        let captured = server.join().unwrap();
        let lower = captured.to_ascii_lowercase();

        assert_eq!(audio, b"converted bytes");
        assert!(captured.starts_with(
            "POST /v1/speech-to-speech/id1?model_id=eleven_multilingual_sts_v2\
             &output_format=mp3_44100_128&remove_background_noise=true HTTP/1.1"
        ));
        assert!(lower.contains("xi-api-key: sk_test"));
        assert!(lower.contains("content-type: multipart/form-data; boundary="));
        assert!(lower.contains("name=\"audio\"; filename=\"clip.mp3\""));
        assert!(lower.contains("content-type: audio/mpeg"));
        assert!(captured.contains("ID3 source audio"));
    }

    #[test]
    fn test_list_voices_over_http() {
        let (base_url, server) = serve_once(
            "200 OK",
            br#"{"voices": [{"voice_id": "id1", "name": "Rachel", "category": "premade"}]}"#,
        );
        let backend = loopback_backend("sk_test", &base_url);

        let response = backend.list_voices().unwrap();
        let captured = server.join().unwrap();

        assert!(captured.starts_with("GET /v1/voices HTTP/1.1"));
        assert!(captured.to_ascii_lowercase().contains("xi-api-key: sk_test"));
        let expected = Voice {
            category: Some("premade".to_string()),
            ..Voice::new("id1", "Rachel")
        };
        assert_eq!(response.voices, vec![expected]);
    }

    #[test]
    fn test_unauthorized_response_is_authentication_error() {
        let (base_url, server) =
            serve_once("401 Unauthorized", br#"{"detail": "invalid_api_key"}"#);
        let backend = loopback_backend("sk_wrong", &base_url);

        let result = backend.list_voices();
        server.join().unwrap();

        match result.unwrap_err() {
            BackendError::Authentication(message) => assert!(message.contains("invalid_api_key")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_response_is_service_error() {
        let (base_url, server) = serve_once("422 Unprocessable Entity", b"bad audio");
        let backend = loopback_backend("sk_test", &base_url);

        let request = ConvertRequest {
            voice_id: "id1".to_string(),
            file_name: "clip.wav".to_string(),
            mime_type: "audio/wav",
            audio: b"RIFF".to_vec(),
            options: ConvertOptions::default(),
        };

        let result = backend.speech_to_speech(&request);
        server.join().unwrap();

        match result.unwrap_err() {
            BackendError::Service { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "bad audio");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            client::status_error(StatusCode::UNAUTHORIZED, "bad key".to_string()),
            BackendError::Authentication(_)
        ));
        assert!(matches!(
            client::status_error(StatusCode::FORBIDDEN, String::new()),
            BackendError::Authentication(_)
        ));

        match client::status_error(StatusCode::UNPROCESSABLE_ENTITY, "bad audio".to_string()) {
            BackendError::Service { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "bad audio");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
