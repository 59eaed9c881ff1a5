// Local configuration for the Folio client.
//
// Global config: `~/.folio/config.toml`
// Session state: `~/.folio/session.json` (see `session.rs`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment override for `api_url`.
pub const API_URL_ENV: &str = "FOLIO_API_URL";
/// Bearer token for the API. Token acquisition happens elsewhere.
pub const TOKEN_ENV: &str = "FOLIO_TOKEN";

const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_TITLE_DEBOUNCE_MS: u64 = 1_000;
const DEFAULT_CONTENT_DEBOUNCE_MS: u64 = 2_000;
const DEFAULT_PAGE_CACHE_TTL_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
/// Debounce windows are clamped to this range.
const MIN_DEBOUNCE_MS: u64 = 100;
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Root directory for Folio client state: `~/.folio/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".folio"))
}

/// Path to the global config file: `~/.folio/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

/// Path to the persisted session: `~/.folio/session.json`.
pub fn session_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("session.json"))
}

// ── Client config ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// API base URL, including any path prefix.
    pub api_url: String,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// Editor sync settings.
    pub sync: SyncConfig,
    /// Page cache settings.
    pub cache: CacheConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            sync: SyncConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load from `~/.folio/config.toml`. Returns defaults if the file
    /// doesn't exist or can't be parsed.
    pub fn load() -> Self {
        global_config_path().and_then(|p| Self::load_from(&p).ok()).unwrap_or_default()
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// API URL after applying the `FOLIO_API_URL` override.
    pub fn effective_api_url(&self) -> String {
        self.api_url_with_override(std::env::var(API_URL_ENV).ok())
    }

    fn api_url_with_override(&self, override_url: Option<String>) -> String {
        override_url.filter(|url| !url.trim().is_empty()).unwrap_or_else(|| self.api_url.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn page_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.page_cache_ttl_secs)
    }
}

/// Bearer token from the environment, if any.
pub fn token_from_env() -> Option<String> {
    std::env::var(TOKEN_ENV).ok().filter(|token| !token.trim().is_empty())
}

/// Debounce windows for the editor sync buffer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub title_debounce_ms: u64,
    pub content_debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            title_debounce_ms: DEFAULT_TITLE_DEBOUNCE_MS,
            content_debounce_ms: DEFAULT_CONTENT_DEBOUNCE_MS,
        }
    }
}

impl SyncConfig {
    /// Title window, clamped to [100ms, 10s].
    pub fn title_window(&self) -> Duration {
        clamp_window(self.title_debounce_ms)
    }

    /// Content window, clamped to [100ms, 10s].
    pub fn content_window(&self) -> Duration {
        clamp_window(self.content_debounce_ms)
    }
}

fn clamp_window(ms: u64) -> Duration {
    Duration::from_millis(ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// How long after a page list refresh `get_page` trusts local records.
    /// 0 disables local hits.
    pub page_cache_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { page_cache_ttl_secs: DEFAULT_PAGE_CACHE_TTL_SECS }
    }
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
