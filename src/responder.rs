//! The station voice responder
//!
//! Ties together speech synthesis, intent matching, wayfinding and
//! emergency alerts behind one handle.

use std::path::Path;

use crate::config::Config;
use crate::emergency::{self, LocationInfo, LogSink, NotificationSink, WebhookSink};
use crate::intent::{IntentMatcher, IntentResponse, ModelBackedMatcher, RuleBasedMatcher};
use crate::voice::SpeechSynthesizer;
use crate::{Result, wayfinding};

/// Voice responder for the station assistant
pub struct VoiceResponder {
    synthesizer: SpeechSynthesizer,
    matcher: Box<dyn IntentMatcher>,
    sink: Box<dyn NotificationSink>,
    default_user_id: Option<String>,
}

impl VoiceResponder {
    /// Create a responder with keyword intents and log-only alerts
    #[must_use]
    pub fn new(synthesizer: SpeechSynthesizer) -> Self {
        Self {
            synthesizer,
            matcher: Box::new(RuleBasedMatcher::default()),
            sink: Box::new(LogSink),
            default_user_id: None,
        }
    }

    /// Build a responder from loaded configuration
    ///
    /// Uses the model-backed matcher when an `OpenAI` key is configured and
    /// the webhook sink when an alert webhook is configured.
    ///
    /// # Errors
    ///
    /// Returns error if a client cannot be constructed
    pub fn from_config(config: Config) -> Result<Self> {
        let Config {
            api_keys,
            tts,
            nlp,
            alerts,
        } = config;

        let synthesizer = SpeechSynthesizer::new(api_keys.elevenlabs, tts)?;
        let mut responder = Self::new(synthesizer);

        if let Some(key) = api_keys.openai {
            let matcher = ModelBackedMatcher::new(key, nlp, RuleBasedMatcher::default())?;
            responder = responder.with_matcher(Box::new(matcher));
        }

        if let Some(url) = alerts.webhook_url {
            responder = responder.with_sink(Box::new(WebhookSink::new(url)?));
        }

        responder.default_user_id = alerts.user_id;

        tracing::info!(
            matcher = responder.matcher.name(),
            sink = responder.sink.name(),
            "voice responder ready"
        );

        Ok(responder)
    }

    /// Replace the intent backend
    #[must_use]
    pub fn with_matcher(mut self, matcher: Box<dyn IntentMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Replace the alert destination
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// User id attached to alerts that arrive without one
    #[must_use]
    pub fn with_default_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.default_user_id = Some(user_id.into());
        self
    }

    /// Underlying synthesizer
    #[must_use]
    pub const fn synthesizer(&self) -> &SpeechSynthesizer {
        &self.synthesizer
    }

    /// Synthesize `text` and write the MP3 to `path`, overwriting any existing file
    ///
    /// Best effort: every failure is logged and reported as `false`. Empty text
    /// fails without contacting the provider. Parent directories are not created.
    pub async fn synthesize_to_file(&self, text: &str, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();

        let audio = match self.synthesizer.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => {
                match e.status() {
                    Some(status) => tracing::warn!(
                        status,
                        error = %e,
                        path = %path.display(),
                        "synthesis rejected"
                    ),
                    None => tracing::warn!(
                        error = %e,
                        path = %path.display(),
                        "synthesis failed"
                    ),
                }
                return false;
            }
        };

        match tokio::fs::write(path, &audio).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), bytes = audio.len(), "audio saved");
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to write audio");
                false
            }
        }
    }

    /// Synthesize `text` through the streaming endpoint and return the MP3 bytes
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty text, `Synthesis` (with the provider's
    /// status code) for a rejected request and `Network` for transport failures
    pub async fn synthesize_to_buffer(&self, text: &str) -> Result<Vec<u8>> {
        self.synthesizer.synthesize_stream(text).await
    }

    /// Classify a rider utterance
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty text
    pub async fn match_intent(&self, text: &str) -> Result<IntentResponse> {
        self.matcher.match_intent(text).await
    }

    /// Spoken guidance toward a detected object
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty label or invalid distance
    #[allow(clippy::unused_self)]
    pub fn wayfinding_guidance(&self, label: &str, distance_m: f64) -> Result<String> {
        wayfinding::wayfinding_guidance(label, distance_m)
    }

    /// Alert station staff and return the rider acknowledgement
    pub async fn emergency_assistance(&self, info: &LocationInfo) -> String {
        if info.user_id.is_none() && self.default_user_id.is_some() {
            let info = LocationInfo {
                user_id: self.default_user_id.clone(),
                ..info.clone()
            };
            return emergency::emergency_assistance(self.sink.as_ref(), &info).await;
        }

        emergency::emergency_assistance(self.sink.as_ref(), info).await
    }

    /// Classify an utterance and voice the reply
    ///
    /// # Errors
    ///
    /// Returns error if the utterance is empty or synthesis fails
    pub async fn respond(&self, text: &str) -> Result<(IntentResponse, Vec<u8>)> {
        let response = self.match_intent(text).await?;
        tracing::debug!(intent = response.intent.as_str(), "voicing reply");

        let audio = self.synthesize_to_buffer(&response.response_text).await?;
        Ok((response, audio))
    }
}
