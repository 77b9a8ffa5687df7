//! Configuration management for the Pandu voice assistant

pub mod file;

use std::time::Duration;

use secrecy::SecretString;

use crate::voice::VoiceSettings;
use crate::{Error, Result};

use file::PanduConfigFile;

/// Default synthesis provider base URL
pub const DEFAULT_TTS_BASE_URL: &str = "https://api.elevenlabs.io";

/// Default voice ("Rachel")
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Default model; covers Indonesian
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// Default intent provider base URL
pub const DEFAULT_NLP_BASE_URL: &str = "https://api.openai.com";

/// Default intent model
pub const DEFAULT_NLP_MODEL: &str = "gpt-4o-mini";

/// Default per-request timeout for outbound calls, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Pandu configuration
#[derive(Debug)]
pub struct Config {
    /// API keys
    pub api_keys: ApiKeys,

    /// Speech synthesis configuration
    pub tts: TtsConfig,

    /// Intent provider configuration
    pub nlp: NlpConfig,

    /// Emergency alert configuration
    pub alerts: AlertConfig,
}

/// API keys for external services
#[derive(Debug)]
pub struct ApiKeys {
    /// `ElevenLabs` API key (required)
    pub elevenlabs: SecretString,

    /// `OpenAI` API key (optional, enables the model-backed intent matcher)
    pub openai: Option<SecretString>,
}

/// Speech synthesis configuration
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Provider base URL, without trailing slash
    pub base_url: String,

    /// Voice identifier
    pub voice_id: String,

    /// Model identifier
    pub model_id: String,

    /// Voice tuning sent with every request
    pub voice_settings: VoiceSettings,

    /// Per-request timeout
    pub timeout: Duration,

    /// Retries for transient failures
    pub max_retries: u32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TTS_BASE_URL.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            voice_settings: VoiceSettings::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 2,
        }
    }
}

/// Intent provider configuration
#[derive(Debug, Clone)]
pub struct NlpConfig {
    /// OpenAI-compatible base URL
    pub base_url: String,

    /// Chat model identifier
    pub model: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NLP_BASE_URL.to_string(),
            model: DEFAULT_NLP_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Emergency alert configuration
#[derive(Debug, Clone, Default)]
pub struct AlertConfig {
    /// Staff dashboard webhook (alerts are only logged when unset)
    pub webhook_url: Option<String>,

    /// Default user identifier attached to alerts
    pub user_id: Option<String>,
}

impl Config {
    /// Load configuration from the environment and the optional TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the synthesis API key is not configured
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// Precedence is env > toml > default.
    ///
    /// # Errors
    ///
    /// Returns error if the synthesis API key is missing or empty
    pub fn from_sources<F>(fc: PanduConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let elevenlabs = var("ELEVENLABS_API_KEY")
            .or(fc.api_keys.elevenlabs)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "ElevenLabs API key required: set ELEVENLABS_API_KEY or api_keys.elevenlabs"
                        .to_string(),
                )
            })?;
        let openai = var("OPENAI_API_KEY")
            .or(fc.api_keys.openai)
            .filter(|k| !k.trim().is_empty());

        let api_keys = ApiKeys {
            elevenlabs: SecretString::from(elevenlabs),
            openai: openai.map(SecretString::from),
        };

        // Voice settings (toml > default)
        let defaults = VoiceSettings::default();
        let voice_settings = VoiceSettings {
            stability: fc.tts.stability.unwrap_or(defaults.stability),
            similarity_boost: fc.tts.similarity_boost.unwrap_or(defaults.similarity_boost),
            style: fc.tts.style.unwrap_or(defaults.style),
            use_speaker_boost: fc.tts.use_speaker_boost.unwrap_or(defaults.use_speaker_boost),
        };

        let tts = TtsConfig {
            base_url: var("PANDU_TTS_BASE_URL")
                .or(fc.tts.base_url)
                .map_or_else(|| DEFAULT_TTS_BASE_URL.to_string(), |u| trim_url(&u)),
            voice_id: var("PANDU_TTS_VOICE_ID")
                .or(fc.tts.voice_id)
                .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            model_id: var("PANDU_TTS_MODEL_ID")
                .or(fc.tts.model_id)
                .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            voice_settings,
            timeout: timeout_secs(
                "PANDU_TTS_TIMEOUT_SECS",
                parsed(&var, "PANDU_TTS_TIMEOUT_SECS").or(fc.tts.timeout_secs),
            )?,
            max_retries: parsed(&var, "PANDU_TTS_MAX_RETRIES")
                .or(fc.tts.max_retries)
                .unwrap_or(2),
        };

        let nlp = NlpConfig {
            base_url: var("PANDU_NLP_BASE_URL")
                .or(fc.nlp.base_url)
                .map_or_else(|| DEFAULT_NLP_BASE_URL.to_string(), |u| trim_url(&u)),
            model: var("PANDU_NLP_MODEL")
                .or(fc.nlp.model)
                .unwrap_or_else(|| DEFAULT_NLP_MODEL.to_string()),
            timeout: timeout_secs(
                "PANDU_NLP_TIMEOUT_SECS",
                parsed(&var, "PANDU_NLP_TIMEOUT_SECS").or(fc.nlp.timeout_secs),
            )?,
        };

        let alerts = AlertConfig {
            webhook_url: var("PANDU_ALERT_WEBHOOK").or(fc.alerts.webhook_url),
            user_id: var("PANDU_USER_ID").or(fc.alerts.user_id),
        };

        tracing::debug!(
            voice_id = %tts.voice_id,
            model_id = %tts.model_id,
            nlp_enabled = api_keys.openai.is_some(),
            alert_webhook = alerts.webhook_url.is_some(),
            "configuration loaded"
        );

        Ok(Self {
            api_keys,
            tts,
            nlp,
            alerts,
        })
    }
}

/// Parse a numeric environment value, warning when it is malformed
fn parsed<T, V>(var: V, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    V: Fn(&str) -> Option<String>,
{
    let raw = var(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable value");
            None
        }
    }
}

/// Timeout from a configured number of seconds; zero is rejected
fn timeout_secs(key: &str, secs: Option<u64>) -> Result<Duration> {
    match secs {
        Some(0) => Err(Error::Config(format!("{key} must be greater than zero"))),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
    }
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_key_fails_fast() {
        let err = Config::from_sources(PanduConfigFile::default(), lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn blank_key_is_missing() {
        let err = Config::from_sources(
            PanduConfigFile::default(),
            lookup(&[("ELEVENLABS_API_KEY", "   ")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn defaults_applied() {
        let config = Config::from_sources(
            PanduConfigFile::default(),
            lookup(&[("ELEVENLABS_API_KEY", "sk_test")]),
        )
        .unwrap();

        assert_eq!(config.api_keys.elevenlabs.expose_secret(), "sk_test");
        assert!(config.api_keys.openai.is_none());
        assert_eq!(config.tts.base_url, DEFAULT_TTS_BASE_URL);
        assert_eq!(config.tts.voice_id, DEFAULT_VOICE_ID);
        assert_eq!(config.tts.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.tts.timeout, Duration::from_secs(30));
        assert_eq!(config.tts.max_retries, 2);
        assert!((config.tts.voice_settings.similarity_boost - 0.75).abs() < f32::EPSILON);
        assert_eq!(config.nlp.model, DEFAULT_NLP_MODEL);
        assert!(config.alerts.webhook_url.is_none());
    }

    #[test]
    fn env_overrides_file() {
        let mut fc = PanduConfigFile::default();
        fc.api_keys.elevenlabs = Some("from_file".to_string());
        fc.tts.voice_id = Some("file_voice".to_string());
        fc.tts.model_id = Some("file_model".to_string());
        fc.tts.stability = Some(0.9);

        let config = Config::from_sources(
            fc,
            lookup(&[
                ("ELEVENLABS_API_KEY", "from_env"),
                ("PANDU_TTS_VOICE_ID", "env_voice"),
                ("PANDU_TTS_BASE_URL", "http://127.0.0.1:9000/"),
                ("PANDU_TTS_MAX_RETRIES", "0"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_keys.elevenlabs.expose_secret(), "from_env");
        assert_eq!(config.tts.voice_id, "env_voice");
        assert_eq!(config.tts.model_id, "file_model");
        assert_eq!(config.tts.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.tts.max_retries, 0);
        assert!((config.tts.voice_settings.stability - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = Config::from_sources(
            PanduConfigFile::default(),
            lookup(&[("ELEVENLABS_API_KEY", "sk_test"), ("PANDU_TTS_TIMEOUT_SECS", "0")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("PANDU_TTS_TIMEOUT_SECS")));

        let mut fc = PanduConfigFile::default();
        fc.nlp.timeout_secs = Some(0);
        let err = Config::from_sources(fc, lookup(&[("ELEVENLABS_API_KEY", "sk_test")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn malformed_numbers_fall_through() {
        let mut fc = PanduConfigFile::default();
        fc.tts.timeout_secs = Some(12);

        let config = Config::from_sources(
            fc,
            lookup(&[
                ("ELEVENLABS_API_KEY", "sk_test"),
                ("PANDU_TTS_TIMEOUT_SECS", "soon"),
                ("PANDU_TTS_MAX_RETRIES", "-1"),
                ("PANDU_NLP_TIMEOUT_SECS", "5"),
            ]),
        )
        .unwrap();

        assert_eq!(config.tts.timeout, Duration::from_secs(12));
        assert_eq!(config.tts.max_retries, 2);
        assert_eq!(config.nlp.timeout, Duration::from_secs(5));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = Config::from_sources(
            PanduConfigFile::default(),
            lookup(&[
                ("ELEVENLABS_API_KEY", "sk_very_secret"),
                ("OPENAI_API_KEY", "sk_other_secret"),
            ]),
        )
        .unwrap();

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk_very_secret"));
        assert!(!rendered.contains("sk_other_secret"));
    }
}
