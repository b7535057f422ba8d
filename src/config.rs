//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote marketplace API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Check the stored token against the server before entering a dashboard
    #[serde(default)]
    pub verify_session: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("nutrihub/{}", env!("CARGO_PKG_VERSION"))
}

impl ApiConfig {
    /// Per-request timeout; zero falls back to the default
    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_secs {
            0 => Duration::from_secs(default_request_timeout()),
            secs => Duration::from_secs(secs),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            verify_session: false,
            user_agent: default_user_agent(),
        }
    }
}

/// Where the persisted session (token + user) lives
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_dir")]
    pub dir: String,
}

fn default_session_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("nutrihub").to_string_lossy().to_string())
        .unwrap_or_else(|| "./.nutrihub".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dir: default_session_dir(),
        }
    }
}

impl SessionConfig {
    /// Full path of the session file, with a leading `~/` expanded
    pub fn file_path(&self) -> PathBuf {
        let dir = match (self.dir.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.dir),
        };
        dir.join("session.json")
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("nutrihub").join("config.toml")),
            Some(PathBuf::from("/etc/nutrihub/config.toml")),
            Some(PathBuf::from("./nutrihub.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(url) = var("NUTRIHUB_API_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = var("NUTRIHUB_API_TIMEOUT") {
            if let Some(secs) = timeout.parse::<u64>().ok().filter(|secs| *secs > 0) {
                self.api.request_timeout_secs = secs;
            }
        }
        if let Some(verify) = var("NUTRIHUB_VERIFY_SESSION") {
            self.api.verify_session = matches!(verify.as_str(), "1" | "true" | "yes");
        }

        // Session overrides
        if let Some(dir) = var("NUTRIHUB_SESSION_DIR") {
            self.session.dir = dir;
        }

        // Logging overrides
        if let Some(level) = var("NUTRIHUB_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("NUTRIHUB_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# NutriHub Configuration
#
# Environment variables override these settings:
# - NUTRIHUB_API_URL
# - NUTRIHUB_API_TIMEOUT
# - NUTRIHUB_VERIFY_SESSION
# - NUTRIHUB_SESSION_DIR
# - NUTRIHUB_LOG_LEVEL
# - NUTRIHUB_LOG_FORMAT

[api]
# Base URL of the marketplace REST API
base_url = "http://localhost:5000/api"

# Request timeout in seconds
request_timeout_secs = 30

# Validate the stored token with the server before opening a dashboard
verify_session = false

[session]
# Directory holding session.json (token + user)
dir = "~/.local/share/nutrihub"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"

# Optional log file path
# file = "/var/log/nutrihub/client.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert!(!config.api.verify_session);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.session.file_path().ends_with("session.json"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [api]
            base_url = "https://api.example.com"
            verify_session = true
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert!(config.api.verify_session);
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.session.dir, "~/.local/share/nutrihub");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                config.session.file_path(),
                home.join(".local/share/nutrihub/session.json")
            );
        }
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NUTRIHUB_API_URL", "http://10.0.0.2:8080"),
            ("NUTRIHUB_API_TIMEOUT", "5"),
            ("NUTRIHUB_VERIFY_SESSION", "true"),
            ("NUTRIHUB_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.api.request_timeout_secs, 5);
        assert!(config.api.verify_session);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_bad_timeout_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|k| (k == "NUTRIHUB_API_TIMEOUT").then(|| "soon".to_string()));
        assert_eq!(config.api.request_timeout_secs, 30);

        config.apply_overrides(|k| (k == "NUTRIHUB_API_TIMEOUT").then(|| "0".to_string()));
        assert_eq!(config.api.request_timeout_secs, 30);
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let config = Config::parse("[api]\nrequest_timeout_secs = 0\n").unwrap();
        assert_eq!(config.api.request_timeout(), Duration::from_secs(30));

        let config = Config::parse("[api]\nrequest_timeout_secs = 7\n").unwrap();
        assert_eq!(config.api.request_timeout(), Duration::from_secs(7));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/nutrihub.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
