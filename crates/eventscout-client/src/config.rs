//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/eventscout/config.toml` by default. Every section and key is
//! optional.
//!
//! The provider `api_key` supports secret references (see [`crate::secret`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use eventscout_core::{DEFAULT_EXPIRY_GRACE, DEFAULT_PAGE_SIZE, ExpiryPolicy};
use eventscout_search::{DEFAULT_MORE_SIZE, DEFAULT_TOP_SIZE, SearchConfig};

use crate::error::{ClientError, ClientResult};
use crate::secret::{self, SecretRef};

/// Configuration for the eventscout client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Provider backend settings.
    pub providers: ProviderSettings,

    /// Search tuning.
    pub search: SearchSettings,

    /// Display settings.
    pub display: DisplaySettings,
}

/// Provider backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the provider proxy backend.
    ///
    /// Without it every provider fails and searches return fallback data.
    pub base_url: Option<String>,

    /// Bearer API key (supports `pass::` and `env::` prefixes).
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl ProviderSettings {
    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the configured base URL, if any and not blank.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Resolves the API key, expanding secret references.
    pub fn resolve_api_key(&self) -> ClientResult<Option<String>> {
        self.api_key
            .as_deref()
            .map(|raw| {
                secret::resolve(raw).map_err(|e| match e {
                    ClientError::Secret(msg) => {
                        ClientError::Secret(format!("failed to resolve providers.api_key: {}", msg))
                    }
                    other => other,
                })
            })
            .transpose()
    }
}

/// Search tuning, mirroring [`SearchConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Maximum number of events in the top bucket.
    pub top_size: usize,

    /// Maximum number of events in the more bucket.
    pub more_size: usize,

    /// Fallback generator latency in milliseconds.
    pub fallback_latency_ms: u64,

    /// Whether past events are dropped.
    pub expiry: ExpiryPolicy,

    /// Hours an event may lie in the past before it counts as expired.
    pub expiry_grace_hours: i64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            top_size: DEFAULT_TOP_SIZE,
            more_size: DEFAULT_MORE_SIZE,
            fallback_latency_ms: 400,
            expiry: ExpiryPolicy::Disabled,
            expiry_grace_hours: 24,
        }
    }
}

impl SearchSettings {
    /// Returns the expiry grace, or the default when the hours are
    /// negative or out of range.
    pub fn expiry_grace(&self) -> chrono::Duration {
        if self.expiry_grace_hours < 0 {
            return DEFAULT_EXPIRY_GRACE;
        }
        chrono::Duration::try_hours(self.expiry_grace_hours).unwrap_or(DEFAULT_EXPIRY_GRACE)
    }

    /// Converts to the search configuration.
    pub fn to_search_config(&self) -> SearchConfig {
        SearchConfig::new(self.expiry)
            .with_sizes(self.top_size, self.more_size)
            .with_fallback_latency(Duration::from_millis(self.fallback_latency_ms))
            .with_expiry_grace(self.expiry_grace())
    }
}

/// Display settings for result output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Events revealed per load-more page.
    pub page_size: usize,

    /// Print JSON instead of text.
    pub json: bool,

    /// Maximum event name length (truncated with ellipsis).
    pub max_title_length: Option<usize>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            json: false,
            max_title_length: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> ClientResult<Self> {
        toml::from_str(content).map_err(|e| ClientError::Config(format!("failed to parse config: {}", e)))
    }

    /// Serializes the configuration back to TOML.
    pub fn to_toml(&self) -> ClientResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))
    }

    /// Checks the configuration for values that would break a search.
    ///
    /// Secret references are resolved so that a missing variable or store
    /// entry is reported here rather than at search time.
    pub fn validate(&self) -> ClientResult<()> {
        if self.search.top_size == 0 {
            return Err(ClientError::Config("search.top_size must be at least 1".to_string()));
        }
        if self.display.page_size == 0 {
            return Err(ClientError::Config("display.page_size must be at least 1".to_string()));
        }
        if self.providers.timeout_secs == 0 {
            return Err(ClientError::Config(
                "providers.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.search.expiry_grace_hours < 0 {
            return Err(ClientError::Config(
                "search.expiry_grace_hours must not be negative".to_string(),
            ));
        }
        if chrono::Duration::try_hours(self.search.expiry_grace_hours).is_none() {
            return Err(ClientError::Config(format!(
                "search.expiry_grace_hours is too large: {}",
                self.search.expiry_grace_hours
            )));
        }
        if let Some(base_url) = self.providers.base_url()
            && !(base_url.starts_with("http://") || base_url.starts_with("https://"))
        {
            return Err(ClientError::Config(format!(
                "providers.base_url must be an http(s) URL, got {:?}",
                base_url
            )));
        }
        self.providers.resolve_api_key()?;
        Ok(())
    }

    /// Returns true if the API key is stored outside the config file.
    pub fn api_key_is_external(&self) -> bool {
        self.providers
            .api_key
            .as_deref()
            .is_some_and(|k| SecretRef::parse(k).is_external())
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eventscout")
    }
}
