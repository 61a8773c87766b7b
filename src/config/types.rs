// Configuration type definitions

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Debounce delay used when the config does not override it
pub const DEFAULT_DEBOUNCE_MS: u64 = 150;

/// Search-as-you-type behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Delay after the last keystroke before a request is dispatched
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Queries shorter than this (after trimming) are treated like an empty query
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_min_query_len() -> usize {
    1
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_query_len: default_min_query_len(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Persisted response cache section
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Freshness window for cached responses
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Overrides the platform cache directory
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: default_cache_enabled(),
            ttl_secs: default_ttl_secs(),
            dir: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Directory holding cache files, `None` when no platform cache dir exists
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|p| p.join("typeahead")))
    }
}

/// Remote endpoint section
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Name of the query-string parameter carrying the search text
    #[serde(default = "default_query_param")]
    pub query_param: String,
    /// JSON pointer (RFC 6901) selecting the results inside the response body
    #[serde(default)]
    pub results_pointer: Option<String>,
    /// Sent as a bearer token when present
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_query_param() -> String {
    "q".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    concat!("typeahead/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            endpoint: None,
            query_param: default_query_param(),
            results_pointer: None,
            token: None,
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
