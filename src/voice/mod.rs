//! Speech synthesis
//!
//! Converts assistant text to MP3 audio through the hosted `ElevenLabs` API.

pub mod retry;
mod tts;

pub use retry::RetryPolicy;
pub use tts::{SpeechSynthesizer, SynthesisRequest, VoiceSettings};
