use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid session_duration_secs: {0}. Must be positive")]
    InvalidSessionDuration(i64),

    #[error(
        "Invalid renewal_threshold_secs ({0}): must be positive and less than session_duration_secs ({1})"
    )]
    InvalidRenewalThreshold(i64, i64),

    #[error("Invalid observer_buffer_size: {0}. Must be at least 1")]
    InvalidObserverBufferSize(usize),

    #[error("Invalid retention_ttl_secs: {0}. Must be positive")]
    InvalidIdempotencyTtl(i64),
}

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .orchestrator/config.yaml (project config)
    /// 3. .orchestrator/local.yaml (project local overrides, optional)
    /// 4. Environment variables (`ORCHESTRATOR_*` prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".orchestrator/config.yaml"))
            .merge(Yaml::file(".orchestrator/local.yaml"))
            .merge(Env::prefixed("ORCHESTRATOR_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.session.session_duration_secs <= 0 {
            return Err(ConfigError::InvalidSessionDuration(
                config.session.session_duration_secs,
            ));
        }

        if config.session.renewal_threshold_secs <= 0
            || config.session.renewal_threshold_secs >= config.session.session_duration_secs
        {
            return Err(ConfigError::InvalidRenewalThreshold(
                config.session.renewal_threshold_secs,
                config.session.session_duration_secs,
            ));
        }

        if config.event_bus.observer_buffer_size == 0 {
            return Err(ConfigError::InvalidObserverBufferSize(
                config.event_bus.observer_buffer_size,
            ));
        }

        if config.idempotency.retention_ttl_secs <= 0 {
            return Err(ConfigError::InvalidIdempotencyTtl(
                config.idempotency.retention_ttl_secs,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.database.path, ".orchestrator/orchestrator.db");
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("default config should be valid");
    }

    #[test]
    fn yaml_overrides_merge_over_defaults() {
        let yaml = r"
database:
  path: /custom/path.db
  max_connections: 5
logging:
  level: debug
  format: pretty
session:
  session_duration_secs: 3600
  renewal_threshold_secs: 300
";
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
            .expect("figment should merge yaml over defaults");

        assert_eq!(config.database.path, "/custom/path.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.session.session_duration_secs, 3600);
        ConfigLoader::validate(&config).expect("merged config should be valid");
    }

    #[test]
    fn rejects_empty_database_path() {
        let mut config = Config::default();
        config.database.path = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDatabasePath)
        ));
    }

    #[test]
    fn rejects_zero_max_connections() {
        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxConnections(0))
        ));
    }

    #[test]
    fn rejects_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn rejects_renewal_threshold_not_smaller_than_duration() {
        let mut config = Config::default();
        config.session.session_duration_secs = 3600;
        config.session.renewal_threshold_secs = 3600;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRenewalThreshold(3600, 3600))
        ));
    }

    #[test]
    fn rejects_zero_observer_buffer_size() {
        let mut config = Config::default();
        config.event_bus.observer_buffer_size = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidObserverBufferSize(0))
        ));
    }

    #[test]
    fn load_from_file_reads_a_real_yaml_file_on_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp config file");
        std::io::Write::write_all(
            &mut file,
            b"database:\n  path: /tmp/from-disk.db\n  max_connections: 7\n",
        )
        .expect("write temp config file");

        let config = ConfigLoader::load_from_file(file.path()).expect("load config from file");
        assert_eq!(config.database.path, "/tmp/from-disk.db");
        assert_eq!(config.database.max_connections, 7);
    }

    #[test]
    fn env_prefix_is_orchestrator() {
        temp_env::with_var("ORCHESTRATOR_LOGGING__LEVEL", Some("debug"), || {
            let config: Config = Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Env::prefixed("ORCHESTRATOR_").split("__"))
                .extract()
                .expect("env override should extract");
            assert_eq!(config.logging.level, "debug");
        });
    }
}
