//! voice-converter-rs: batch speech-to-speech voice conversion.
//!
//! This crate converts folders of voice recordings into one or more target
//! voices through the ElevenLabs speech-to-speech API, writing one output
//! file per (recording, voice) pair.

pub mod backend;
pub mod batch;
pub mod cli;
pub mod config;
pub mod converter;
