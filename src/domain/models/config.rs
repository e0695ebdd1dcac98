use serde::{Deserialize, Serialize};

use crate::infrastructure::logging::config::LogConfig;

/// Top-level orchestrator configuration: the settings record the service
/// context builds from, independent of how it was loaded (see
/// `infrastructure::config::ConfigLoader`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfigShim,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub event_bus: EventBusConfig,

    #[serde(default)]
    pub idempotency: IdempotencyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfigShim::default(),
            session: SessionConfig::default(),
            event_bus: EventBusConfig::default(),
            idempotency: IdempotencyConfig::default(),
        }
    }
}

impl Config {
    /// Project the figment-facing logging shim into the `LogConfig` the
    /// logger actually consumes.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.logging.level.clone(),
            format: self.logging.format,
            log_dir: self.logging.log_dir.clone(),
            enable_stdout: self.logging.enable_stdout,
            rotation: self.logging.rotation,
            retention_days: self.logging.retention_days,
        }
    }
}

/// `SQLite` connection settings for the campaign store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".orchestrator/orchestrator.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_database_path(), max_connections: default_max_connections() }
    }
}

/// Figment-facing logging settings; `serde`-friendly mirror of
/// `infrastructure::logging::config::LogConfig` so it can live in the
/// hierarchical config without importing `PathBuf`-typed figment quirks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfigShim {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: crate::infrastructure::logging::config::LogFormat,
    pub log_dir: Option<std::path::PathBuf>,
    #[serde(default = "default_true")]
    pub enable_stdout: bool,
    #[serde(default)]
    pub rotation: crate::infrastructure::logging::config::RotationPolicy,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> crate::infrastructure::logging::config::LogFormat {
    crate::infrastructure::logging::config::LogFormat::Json
}

fn default_true() -> bool {
    true
}

fn default_retention_days() -> i64 {
    30
}

impl Default for LoggingConfigShim {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: crate::infrastructure::logging::config::LogFormat::Json,
            log_dir: None,
            enable_stdout: default_true(),
            rotation: crate::infrastructure::logging::config::RotationPolicy::Daily,
            retention_days: default_retention_days(),
        }
    }
}

/// Session lifecycle settings (§4.5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionConfig {
    #[serde(default = "default_session_duration_secs")]
    pub session_duration_secs: i64,
    #[serde(default = "default_renewal_threshold_secs")]
    pub renewal_threshold_secs: i64,
    #[serde(default = "default_true")]
    pub enforce_ip_binding: bool,
}

const fn default_session_duration_secs() -> i64 {
    7 * 24 * 3600
}

const fn default_renewal_threshold_secs() -> i64 {
    6 * 3600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_duration_secs: default_session_duration_secs(),
            renewal_threshold_secs: default_renewal_threshold_secs(),
            enforce_ip_binding: true,
        }
    }
}

/// Event bus / SSE delivery settings (§4.3, §5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EventBusConfig {
    #[serde(default = "default_observer_buffer_size")]
    pub observer_buffer_size: usize,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_interval_secs: u64,
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

const fn default_observer_buffer_size() -> usize {
    256
}

const fn default_keep_alive_secs() -> u64 {
    20
}

const fn default_max_consecutive_failures() -> u32 {
    3
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            observer_buffer_size: default_observer_buffer_size(),
            keep_alive_interval_secs: default_keep_alive_secs(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

/// Idempotency store TTL (§4.2, §9).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IdempotencyConfig {
    #[serde(default = "default_idempotency_ttl_secs")]
    pub retention_ttl_secs: i64,
}

const fn default_idempotency_ttl_secs() -> i64 {
    24 * 3600
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self { retention_ttl_secs: default_idempotency_ttl_secs() }
    }
}
