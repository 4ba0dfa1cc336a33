//! Converter client over the speech-to-speech backend.
//!
//! Wraps voice listing with a configurable cache and single-file
//! conversion that never aborts its caller.

mod voice_converter;

pub use voice_converter::{CachePolicy, ConvertError, VoiceConverter, VoiceSelection};
