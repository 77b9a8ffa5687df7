//! Pandu Voice - voice prompts and replies for a train-station assistant
//!
//! This library provides:
//! - Speech synthesis through the `ElevenLabs` TTS API (full and streaming)
//! - Intent matching for rider utterances (keyword rules or a chat model)
//! - Wayfinding guidance from object detection distances
//! - Emergency alerts delivered to station staff
//! - Booking orders extracted from voice-agent conversation analysis
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  VoiceResponder                     │
//! │  Intents  │  Wayfinding  │  Emergency  │  Demo      │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │   SpeechSynthesizer    │    NotificationSink         │
//! │   (ElevenLabs API)     │    (log / webhook)          │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod booking;
pub mod config;
pub mod demo;
pub mod emergency;
pub mod error;
pub mod intent;
pub mod responder;
pub mod voice;
pub mod wayfinding;

pub use config::Config;
pub use emergency::{AlertRecord, LocationInfo, NotificationSink, Urgency};
pub use error::{Error, Result};
pub use intent::{Intent, IntentMatcher, IntentResponse, ModelBackedMatcher, RuleBasedMatcher};
pub use responder::VoiceResponder;
pub use voice::{SpeechSynthesizer, SynthesisRequest, VoiceSettings};
pub use wayfinding::wayfinding_guidance;
