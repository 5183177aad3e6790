use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::wizard::WizardConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tui: TuiConfig,
    pub data: DataConfig,
    pub gemini: GeminiConfig,
    pub wizard: WizardConfig,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

/// Gemini endpoint and model selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    /// Model for prompt enhancement and critiques.
    pub text_model: String,
    pub garment_model: String,
    pub try_on_model: String,
    pub timeout_secs: u64,
    pub garment_aspect_ratio: String,
    pub try_on_aspect_ratio: String,
    pub try_on_image_size: String,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 100 }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            garment_model: "gemini-2.5-flash-image".to_string(),
            try_on_model: "gemini-3-pro-image-preview".to_string(),
            timeout_secs: 300,
            garment_aspect_ratio: "1:1".to_string(),
            try_on_aspect_ratio: "3:4".to_string(),
            try_on_image_size: "1K".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/wearai/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &std::path::Path) -> Self {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e}, using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("wearai"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    /// Where downloaded try-on results are written.
    pub fn downloads_dir(&self) -> PathBuf {
        self.data_dir().join("downloads")
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("wearai").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
