//! Text-to-speech (TTS) synthesis via the `ElevenLabs` API

use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::retry::{RetryPolicy, delay_for_attempt};
use crate::config::TtsConfig;
use crate::{Error, Result};

/// Number of characters shown when logging the text being synthesized
const PREVIEW_CHARS: usize = 50;

/// Voice tuning sent with every synthesis request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

/// A single synthesis call
///
/// Built once per call and never mutated; serializes to the provider's JSON body.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisRequest {
    text: String,
    model_id: String,
    voice_settings: VoiceSettings,
    #[serde(skip)]
    voice_id: String,
}

impl SynthesisRequest {
    /// Create a request
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the text is empty or whitespace only
    pub fn new(
        text: &str,
        voice_id: &str,
        model_id: &str,
        voice_settings: VoiceSettings,
    ) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("text to synthesize is empty".to_string()));
        }

        Ok(Self {
            text: text.to_string(),
            model_id: model_id.to_string(),
            voice_settings,
            voice_id: voice_id.to_string(),
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    #[must_use]
    pub const fn voice_settings(&self) -> &VoiceSettings {
        &self.voice_settings
    }
}

/// Which provider endpoint to call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Endpoint {
    /// Full body in one response
    Full,
    /// Chunked transfer
    Stream,
}

/// Synthesizes speech from text
pub struct SpeechSynthesizer {
    client: reqwest::Client,
    api_key: SecretString,
    config: TtsConfig,
    retry: RetryPolicy,
}

impl std::fmt::Debug for SpeechSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechSynthesizer")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl SpeechSynthesizer {
    /// Create a synthesizer with a bounded request timeout
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty or the HTTP client cannot be built
    pub fn new(api_key: SecretString, config: TtsConfig) -> Result<Self> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for TTS".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let retry = RetryPolicy::with_max_retries(config.max_retries);

        Ok(Self {
            client,
            api_key,
            config,
            retry,
        })
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Active synthesis configuration
    #[must_use]
    pub const fn config(&self) -> &TtsConfig {
        &self.config
    }

    /// Build the request for `text` with the configured voice, model and settings
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the text is empty
    pub fn request(&self, text: &str) -> Result<SynthesisRequest> {
        SynthesisRequest::new(
            text,
            &self.config.voice_id,
            &self.config.model_id,
            self.config.voice_settings,
        )
    }

    /// Synthesize text to MP3 using the non-streaming endpoint
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty text, `Synthesis` for a non-2xx status and
    /// `Network` for transport failures that outlast the retry policy
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = self.request(text)?;
        let response = self.send(&request, Endpoint::Full).await?;
        let audio = response.bytes().await?;

        tracing::debug!(bytes = audio.len(), "synthesis complete");
        Ok(audio.to_vec())
    }

    /// Synthesize text to MP3 using the streaming endpoint
    ///
    /// Chunks are collected into one buffer as they arrive.
    ///
    /// # Errors
    ///
    /// Same as [`Self::synthesize`]; a stream interrupted midway yields `Network`
    pub async fn synthesize_stream(&self, text: &str) -> Result<Vec<u8>> {
        let request = self.request(text)?;
        let response = self.send(&request, Endpoint::Stream).await?;

        let mut audio = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            audio.extend_from_slice(&chunk?);
        }

        tracing::debug!(bytes = audio.len(), "streamed synthesis complete");
        Ok(audio)
    }

    /// Send a request, retrying transient failures
    async fn send(
        &self,
        request: &SynthesisRequest,
        endpoint: Endpoint,
    ) -> Result<reqwest::Response> {
        tracing::info!(
            preview = %preview(request.text()),
            voice_id = %request.voice_id(),
            ?endpoint,
            "converting text to speech"
        );

        let mut attempt = 0;
        loop {
            match self.send_once(request, endpoint).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    let delay = delay_for_attempt(&self.retry, attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.retry.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "transient synthesis failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        request: &SynthesisRequest,
        endpoint: Endpoint,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint_url(request.voice_id(), endpoint);

        let response = self
            .client
            .post(&url)
            .header("Accept", "audio/mpeg")
            .header("Content-Type", "application/json")
            .header("xi-api-key", self.api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis { status, body });
        }

        Ok(response)
    }

    fn endpoint_url(&self, voice_id: &str, endpoint: Endpoint) -> String {
        let base = format!("{}/v1/text-to-speech/{voice_id}", self.config.base_url);
        match endpoint {
            Endpoint::Full => base,
            Endpoint::Stream => format!("{base}/stream"),
        }
    }
}

/// First few characters of `text`, for logs
fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().nth(PREVIEW_CHARS).is_some() {
        out.push_str("...");
    }
    out
}
