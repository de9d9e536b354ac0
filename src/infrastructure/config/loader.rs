use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid {0}: must be greater than 0")]
    ZeroDuration(&'static str),

    #[error(
        "Invalid prober timeouts: hard_timeout_ms ({1}) must be at least command_timeout_ms ({0})"
    )]
    InvalidHardTimeout(u64, u64),

    #[error("Invalid health_retries: {0}. Must be at least 1")]
    InvalidHealthRetries(u32),

    #[error("Invalid max_concurrent_sequences: {0}. Must be between 1 and 256")]
    InvalidPoolSize(usize),

    #[error("Target '{0}' has an empty {1} program")]
    EmptyTargetProgram(String, &'static str),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .arbiter/config.yaml (project config)
    /// 3. .arbiter/local.yaml (project local overrides, optional)
    /// 4. Environment variables (ARBITER_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("ARBITER_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".arbiter/config.yaml"))
            .merge(Yaml::file(".arbiter/local.yaml"))
            .merge(Env::prefixed("ARBITER_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        let prober = &config.prober;
        if prober.command_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("command_timeout_ms"));
        }
        if prober.health_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("health_timeout_ms"));
        }
        if prober.hard_timeout_ms < prober.command_timeout_ms {
            return Err(ConfigError::InvalidHardTimeout(
                prober.command_timeout_ms,
                prober.hard_timeout_ms,
            ));
        }
        if prober.health_retries == 0 {
            return Err(ConfigError::InvalidHealthRetries(prober.health_retries));
        }

        let pool_size = config.pool.max_concurrent_sequences;
        if pool_size == 0 || pool_size > 256 {
            return Err(ConfigError::InvalidPoolSize(pool_size));
        }

        for (name, target) in &config.targets {
            if target.command.first().is_none_or(String::is_empty) {
                return Err(ConfigError::EmptyTargetProgram(name.clone(), "command"));
            }
            if target.health.first().is_none_or(String::is_empty) {
                return Err(ConfigError::EmptyTargetProgram(name.clone(), "health"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::TargetConfig;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.prober.command_timeout_ms, 3000);
        assert_eq!(config.prober.hard_timeout_ms, 6000);
        assert_eq!(config.pool.max_concurrent_sequences, 4);
        assert!(!config.policy.zero_count_equals_null_row);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
logging:
  level: debug
  format: pretty
prober:
  command_timeout_ms: 500
  hard_timeout_ms: 1500
  health_retries: 2
pool:
  max_concurrent_sequences: 8
  failure_budget: 3
policy:
  zero_count_equals_null_row: true
targets:
  redis:
    command: [redis-cli, -p, '6379']
    health: [redis-cli, ping]
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.prober.command_timeout_ms, 500);
        assert_eq!(config.prober.health_interval_ms, 1000, "unset field keeps default");
        assert_eq!(config.pool.failure_budget, Some(3));
        assert!(config.policy.zero_count_equals_null_row);
        assert_eq!(config.targets["redis"].command[0], "redis-cli");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidLogFormat(_)
        ));
    }

    #[test]
    fn test_validate_zero_command_timeout() {
        let mut config = Config::default();
        config.prober.command_timeout_ms = 0;

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ZeroDuration("command_timeout_ms")
        ));
    }

    #[test]
    fn test_validate_hard_timeout_below_budget() {
        let mut config = Config::default();
        config.prober.command_timeout_ms = 5000;
        config.prober.hard_timeout_ms = 1000;

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidHardTimeout(5000, 1000)
        ));
    }

    #[test]
    fn test_validate_zero_health_retries() {
        let mut config = Config::default();
        config.prober.health_retries = 0;

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidHealthRetries(0)
        ));
    }

    #[test]
    fn test_validate_pool_size() {
        let mut config = Config::default();
        config.pool.max_concurrent_sequences = 0;

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidPoolSize(0)
        ));
    }

    #[test]
    fn test_validate_empty_target_program() {
        let mut config = Config::default();
        config.targets.insert(
            "mongo".to_string(),
            TargetConfig {
                command: vec![],
                health: vec!["mongosh".to_string()],
            },
        );

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::EmptyTargetProgram(name, which) => {
                assert_eq!(name, "mongo");
                assert_eq!(which, "command");
            }
            other => panic!("Expected EmptyTargetProgram error, got {other:?}"),
        }
    }

    #[test]
    fn test_env_override() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "prober:\n  command_timeout_ms: 800\n").unwrap();

        temp_env::with_vars(
            [
                ("ARBITER_PROBER__COMMAND_TIMEOUT_MS", Some("1200")),
                ("ARBITER_LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.prober.command_timeout_ms, 1200, "Env should win");
                assert_eq!(config.logging.level, "debug");
            },
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "prober:\n  command_timeout_ms: 1000\n  health_retries: 2\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "prober:\n  command_timeout_ms: 2000\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.prober.command_timeout_ms, 2000, "Override should win");
        assert_eq!(config.prober.health_retries, 2, "Base value should persist");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }
}
