//! Configuration management for the loan default API

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Environment variable pointing at an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "LOAN_API_CONFIG";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind, an IP literal or a resolvable host name
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl ServerConfig {
    /// Host and port handed to the listener, resolved at bind time
    pub fn bind_address(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

/// Client dataset configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// CSV file holding the client sample
    pub path: PathBuf,
    /// Maximum number of data rows read from the file
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Column holding the unique client identifier
    #[serde(default = "default_id_column")]
    pub id_column: String,
}

fn default_sample_size() -> usize {
    10_000
}

fn default_id_column() -> String {
    "SK_ID_CURR".to_string()
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model artifact: `.json` logistic artifact or `.onnx` graph
    pub path: PathBuf,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// In-process metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between periodic summaries, 0 disables the reporter
    pub report_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load configuration from `LOAN_API_CONFIG` or the default path
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path, with `LOAN_API__*` environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("LOAN_API").separator("__"))
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path.as_ref().display()))?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            dataset: DatasetConfig {
                path: PathBuf::from("data/test_df_sample.csv"),
                sample_size: default_sample_size(),
                id_column: default_id_column(),
            },
            model: ModelConfig {
                path: PathBuf::from("data/model.json"),
                onnx_threads: default_onnx_threads(),
            },
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.dataset.sample_size, 10_000);
        assert_eq!(config.dataset.id_column, "SK_ID_CURR");
        assert_eq!(config.model.onnx_threads, 1);
        assert_eq!(config.metrics.report_interval_secs, 60);
    }

    #[test]
    fn test_bind_address_accepts_host_names() {
        use std::net::ToSocketAddrs;

        let config = AppConfig::default();
        assert_eq!(config.server.bind_address(), ("127.0.0.1", 5000));

        let named = ServerConfig {
            host: "localhost".to_string(),
            port: 5000,
        };
        let resolved: Vec<_> = named.bind_address().to_socket_addrs().unwrap().collect();
        assert!(resolved.iter().all(|addr| addr.port() == 5000));
        assert!(!resolved.is_empty());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let config = AppConfig::load_from_path(path).unwrap();
        let defaults = AppConfig::default();

        assert_eq!(config.server.port, defaults.server.port);
        assert_eq!(config.dataset.path, defaults.dataset.path);
        assert_eq!(config.dataset.sample_size, defaults.dataset.sample_size);
        assert_eq!(config.model.path, defaults.model.path);
        assert_eq!(config.logging.format, defaults.logging.format);
    }
}
