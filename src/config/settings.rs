use std::path::PathBuf;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Tried when the configured model is not in the provider's listing.
pub const FALLBACK_MODEL: &str = "gemini-pro";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the default save location under the data dir.
    pub save_path: Option<PathBuf>,

    /// Weekday on which the weekly rest is re-enabled.
    pub reset_weekday: Weekday,

    pub oracle: OracleSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            save_path: None,
            reset_weekday: Weekday::Mon,
            oracle: OracleSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    /// Gemini base URL, or a full OpenAI-compatible `/chat/completions` URL.
    pub api_url: String,
    pub model: String,

    /// Last resort in the credential chain; prefer the env var or secrets file.
    pub api_key: Option<String>,

    pub temperature: f32,

    /// `None` keeps the HTTP client's own default.
    pub timeout_secs: Option<u64>,

    /// Check the configured model against the provider's model listing
    /// when the client is built.
    pub discover_model: bool,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            api_url: GEMINI_API_URL.into(),
            model: DEFAULT_MODEL.into(),
            api_key: None,
            temperature: 0.7,
            timeout_secs: None,
            discover_model: true,
        }
    }
}
