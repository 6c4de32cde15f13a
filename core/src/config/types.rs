use serde::{Deserialize, Serialize};

use crate::dispatch::DEFAULT_QUIET_PERIOD;
use crate::state::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "pagestate=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the file backend. Empty means `<data dir>/storage`.
    #[serde(default)]
    pub directory: Option<String>,

    /// Optional byte quota for the memory backend.
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Quiet period for debounced text-input actions.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_QUIET_PERIOD.as_millis() as u64
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_open_library_url")]
    pub open_library_url: String,

    #[serde(default = "default_genshin_url")]
    pub genshin_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// When false, apps use their bundled fixtures instead of remote APIs.
    #[serde(default)]
    pub remote: bool,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_open_library_url() -> String {
    "https://openlibrary.org".to_string()
}

fn default_genshin_url() -> String {
    "https://genshin.jmp.blue".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            open_library_url: default_open_library_url(),
            genshin_url: default_genshin_url(),
            timeout_ms: default_timeout_ms(),
            remote: false,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit")]
    pub limit: u32,

    #[serde(default = "default_rate_window_secs")]
    pub window_secs: i64,
}

fn default_rate_limit() -> u32 {
    60
}

fn default_rate_window_secs() -> i64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: default_rate_limit(),
            window_secs: default_rate_window_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.dispatch.debounce_ms, 300);
        assert_eq!(cfg.pagination.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert!(!cfg.sources.remote);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [storage]
            backend = "memory"
            quota_bytes = 5000

            [sources]
            remote = true
            [sources.rate_limit]
            limit = 10
            "#,
        )
        .unwrap();
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert_eq!(cfg.storage.quota_bytes, Some(5000));
        assert!(cfg.sources.remote);
        assert_eq!(cfg.sources.rate_limit.limit, 10);
        assert_eq!(cfg.sources.rate_limit.window_secs, 60);
        assert_eq!(cfg.sources.timeout_ms, 10_000);
    }
}
