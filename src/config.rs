use crate::error::{AppError, Result};
use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming an optional configuration file
pub const CONFIG_PATH_ENV: &str = "ROMSEARCH_CONFIG";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Index, adapter and dictionary configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the embedded defaults, a file and the environment.
    ///
    /// The file is `path` when given, otherwise the one named by
    /// `ROMSEARCH_CONFIG`. Environment variables use the `ROMSEARCH` prefix and
    /// `__` as nesting separator, e.g. `ROMSEARCH_SEARCH__MAX_RESULTS=50`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(|p| p.to_string_lossy().into_owned())
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok());

        let mut builder = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ));

        if let Some(config_path) = config_path {
            builder = builder.add_source(config::File::with_name(&config_path).required(true));
        }

        let config: Config = builder
            // Override with environment variables (prefix: ROMSEARCH_)
            .add_source(
                config::Environment::with_prefix("ROMSEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.search.validate().map_err(AppError::from)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_defaults_match_code_defaults() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_with_file_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[search]\nmax_results = 25\n\n[observability]\njson_logs = true").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.search.max_results, 25);
        assert!(config.observability.json_logs);
        assert_eq!(config.search.name_adapters, SearchConfig::default().name_adapters);
    }

    #[test]
    fn test_load_rejects_invalid_limits() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[search]\nmax_results = 5000").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/romsearch.toml"))).is_err());
    }
}
