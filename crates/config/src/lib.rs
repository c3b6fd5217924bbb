use std::env;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod prefs;

pub use prefs::{GenderPreference, PreferenceStore, Preferences};

/// Placeholder fragment that marks a credential as unusable even when set.
const PLACEHOLDER_KEY_FRAGMENT: &str = "your-api-key";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub name: String,
    /// Four-letter personality type code the bot specializes in.
    pub type_code: String,
    pub nickname: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "ISTP 전문가".to_string(),
            type_code: "ISTP".to_string(),
            nickname: "논리적 실용주의자".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Full generateContent endpoint, model segment included.
    pub base_url: String,
    /// Credential for the generation API.  Overridden at runtime by the
    /// `GEMINI_API_KEY` environment variable when set.
    pub api_key: String,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    /// Upper bound on a single remote call; expiry is reported as a
    /// network failure.
    pub timeout_secs: u64,
    /// Skip the remote path entirely and answer from local templates even
    /// when a usable credential is configured.
    pub force_mock: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url:
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
                    .to_string(),
            api_key: String::new(),
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1000,
            timeout_secs: 30,
            force_mock: false,
        }
    }
}

impl ApiConfig {
    /// A credential is usable when it is non-empty and not the placeholder
    /// shipped in sample configs.
    pub fn has_usable_credential(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && !key.contains(PLACEHOLDER_KEY_FRAGMENT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Pause between emitted characters during the typing effect.
    pub char_interval_ms: u64,
    /// Lower bound of the simulated thinking delay on the local path.
    pub think_delay_min_ms: u64,
    /// Upper bound of the simulated thinking delay on the local path.
    pub think_delay_max_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            char_interval_ms: 50,
            think_delay_min_ms: 1000,
            think_delay_max_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub api: ApiConfig,
    pub delivery: DeliveryConfig,
    pub chat: ChatConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }

        // Credential env override (takes precedence over the config file).
        if let Ok(key) = env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                config.api.api_key = key;
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
