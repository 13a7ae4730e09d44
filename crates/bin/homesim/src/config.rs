//! Configuration loading — TOML file with environment variable overrides.
//!
//! Reads `homesim.toml` (or the path given on the command line). Every field
//! has a sensible default so the file is optional. Environment variables
//! take precedence over file values.

use std::path::Path;

use serde::Deserialize;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "homesim.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Execution history settings.
    pub history: HistoryConfig,
    /// Initial house contents.
    pub bootstrap: BootstrapConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Rule execution history.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of execution reports kept.
    pub capacity: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Seed the default rooms, devices and rules.
    pub defaults: bool,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is
    /// malformed, or if the resulting values are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path.as_ref())?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("HOMESIM_HISTORY") {
            if let Ok(capacity) = val.parse() {
                self.history.capacity = capacity;
            }
        }
        if let Some(val) = lookup("HOMESIM_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.history.capacity == 0 {
            return Err(ConfigError::Validation(
                "history capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homesim=info,homesim_app=info".to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: homesim_app::rule_engine::DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self { defaults: true }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.history.capacity, 10);
        assert!(config.bootstrap.defaults);
        assert!(config.logging.filter.contains("homesim=info"));
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.history.capacity, 10);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [logging]
            filter = 'debug'

            [history]
            capacity = 25

            [bootstrap]
            defaults = false
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.history.capacity, 25);
        assert!(!config.bootstrap.defaults);
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [history]
            capacity = 3
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.history.capacity, 3);
        assert!(config.bootstrap.defaults);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file(Path::new("nonexistent.toml")).unwrap();
        assert_eq!(config.history.capacity, 10);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_zero_history_capacity() {
        let mut config = Config::default();
        config.history.capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_prefer_rust_log_over_homesim_log() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[("HOMESIM_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");

        let mut config = Config::default();
        config.apply_overrides(lookup(&[("HOMESIM_LOG", "warn")]));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_override_history_capacity_from_env() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[("HOMESIM_HISTORY", "42")]));
        assert_eq!(config.history.capacity, 42);
    }

    #[test]
    fn should_ignore_unparsable_history_override() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[("HOMESIM_HISTORY", "lots")]));
        assert_eq!(config.history.capacity, 10);
    }
}
