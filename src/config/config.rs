use crate::api::models::{Marketplace, SearchMode};
use crate::state::pacing::{LogPolling, Pacing};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no backend URL configured: pass --backend-url, set SHOPPER_BACKEND_URL, or set [backend] url in the config file")]
    MissingBackendUrl,

    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to read or write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub search: SearchConfig,
    pub auth: AuthConfig,
    pub pacing: PacingConfig,
    pub logs: LogsConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the search backend, e.g. "http://127.0.0.1:8000"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub marketplace: Marketplace,
    pub mode: SearchMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Fixed bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Session helper answering {"accessToken": ...}
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub step_delay_ms: u64,
    pub final_step_delay_ms: u64,
    pub results_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    pub poll_interval_ms: u64,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for task status icons
    pub use_glyphs: bool,

    /// Icons for task step states (can be overridden)
    pub icons: IconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub pending: String,
    pub loading: String,
    pub done: String,
    pub error: String,
}

impl Default for PacingConfig {
    fn default() -> Self {
        let pacing = Pacing::default();
        Self {
            step_delay_ms: pacing.step_delay.as_millis() as u64,
            final_step_delay_ms: pacing.final_step_delay.as_millis() as u64,
            results_delay_ms: pacing.results_delay.as_millis() as u64,
        }
    }
}

impl PacingConfig {
    pub fn to_pacing(&self) -> Pacing {
        Pacing {
            step_delay: Duration::from_millis(self.step_delay_ms),
            final_step_delay: Duration::from_millis(self.final_step_delay_ms),
            results_delay: Duration::from_millis(self.results_delay_ms),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        let polling = LogPolling::default();
        Self {
            poll_interval_ms: polling.interval.as_millis() as u64,
            limit: polling.limit,
        }
    }
}

impl LogsConfig {
    pub fn to_log_polling(&self) -> LogPolling {
        LogPolling {
            // A zero interval would spin the poller
            interval: Duration::from_millis(self.poll_interval_ms.max(100)),
            limit: self.limit.max(1),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            icons: IconConfig::default(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            pending: "○".to_string(),
            loading: "◌".to_string(),
            done: "✓".to_string(),
            error: "✕".to_string(),
        }
    }
}

impl IconConfig {
    /// Get simple ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            pending: "[ ]".to_string(),
            loading: "[~]".to_string(),
            done: "[x]".to_string(),
            error: "[!]".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load config from `path`, writing the defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("shopper-cli").join("config.toml"))
    }

    /// Pick the backend URL: the explicit value (command line or
    /// SHOPPER_BACKEND_URL) wins over the config file. Having none is fatal.
    pub fn resolve_backend_url(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        let raw = explicit
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or_else(|| {
                self.backend
                    .url
                    .as_deref()
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
            })
            .ok_or(ConfigError::MissingBackendUrl)?;

        let parsed = reqwest::Url::parse(raw).map_err(|e| ConfigError::InvalidBackendUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBackendUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        Ok(raw.trim_end_matches('/').to_string())
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Shopper CLI Configuration File
# Location: ~/.config/shopper-cli/config.toml (Linux)
#           ~/Library/Application Support/shopper-cli/config.toml (macOS)
#           %APPDATA%\shopper-cli\config.toml (Windows)

[backend]
# Base URL of the search backend (required).
# SHOPPER_BACKEND_URL or --backend-url override this.
url = "http://127.0.0.1:8000"

[search]
# Region to search: "india" or "usa"
marketplace = "india"

# Retrieval strategy: "scraper" or "deep-agent"
mode = "scraper"

[auth]
# Either a fixed bearer token (SHOPPER_ACCESS_TOKEN overrides it)...
# token = "..."
# ...or a session helper returning {"accessToken": "..."}
# token_endpoint = "http://localhost:3000/api/auth/token"

[pacing]
# Delays of the progress animation once results arrive (milliseconds)
step_delay_ms = 800
final_step_delay_ms = 500
results_delay_ms = 500

[logs]
# Detailed log panel: poll interval (milliseconds) and lines per poll
poll_interval_ms = 2000
limit = 50

[display]
# Set to false for ASCII-only status icons
use_glyphs = true
"#
        .to_string()
    }
}
