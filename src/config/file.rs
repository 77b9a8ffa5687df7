//! TOML configuration file loading
//!
//! Supports `~/.config/pandu/config.toml` (or `$PANDU_CONFIG`) as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct PanduConfigFile {
    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Speech synthesis configuration
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// Intent provider configuration
    #[serde(default)]
    pub nlp: NlpFileConfig,

    /// Emergency alert delivery
    #[serde(default)]
    pub alerts: AlertsFileConfig,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub elevenlabs: Option<String>,
    pub openai: Option<String>,
}

/// Speech synthesis configuration
#[derive(Debug, Default, Deserialize)]
pub struct TtsFileConfig {
    /// Provider base URL (e.g. "https://api.elevenlabs.io")
    pub base_url: Option<String>,

    /// Voice identifier
    pub voice_id: Option<String>,

    /// Model identifier (e.g. "eleven_multilingual_v2")
    pub model_id: Option<String>,

    pub stability: Option<f32>,
    pub similarity_boost: Option<f32>,
    pub style: Option<f32>,
    pub use_speaker_boost: Option<bool>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Retries for transient failures
    pub max_retries: Option<u32>,
}

/// Intent provider configuration
#[derive(Debug, Default, Deserialize)]
pub struct NlpFileConfig {
    /// OpenAI-compatible base URL
    pub base_url: Option<String>,

    /// Chat model identifier
    pub model: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Emergency alert configuration
#[derive(Debug, Default, Deserialize)]
pub struct AlertsFileConfig {
    /// Staff dashboard webhook; alerts are only logged when unset
    pub webhook_url: Option<String>,

    /// Default user identifier attached to alerts
    pub user_id: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `PanduConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> PanduConfigFile {
    config_file_path().map_or_else(PanduConfigFile::default, |path| load_from(&path))
}

/// Load a config file from an explicit path, falling back to defaults
pub fn load_from(path: &Path) -> PanduConfigFile {
    if !path.exists() {
        return PanduConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                PanduConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            PanduConfigFile::default()
        }
    }
}

/// Return the config file path: `$PANDU_CONFIG` or `~/.config/pandu/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("PANDU_CONFIG") {
        return Some(PathBuf::from(path));
    }

    directories::BaseDirs::new().map(|d| d.config_dir().join("pandu").join("config.toml"))
}
