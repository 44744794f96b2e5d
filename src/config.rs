use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::application::{PollingConfig, DEFAULT_POLL_INTERVAL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub live_path: PathBuf,
    pub history_path: PathBuf,
    pub allow_empty: bool,
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub include_history: bool,
    pub log_level: String,
}

/// Optional overrides read from a TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    port: Option<u16>,
    live_path: Option<PathBuf>,
    history_path: Option<PathBuf>,
    allow_empty: Option<bool>,
    base_url: Option<String>,
    poll_interval_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    include_history: Option<bool>,
    log_level: Option<String>,
}

impl Config {
    /// `SOLARDASH_CONFIG` file (if set), then environment on top
    pub fn load() -> Result<Self, ConfigError> {
        let base = match env::var("SOLARDASH_CONFIG") {
            Ok(path) => Self::defaults().with_file(Path::new(&path))?,
            Err(_) => Self::defaults(),
        };
        Ok(base.with_env(|key| env::var(key).ok()))
    }

    pub fn defaults() -> Self {
        Self {
            port: 5000,
            live_path: PathBuf::from("data/live.json"),
            history_path: PathBuf::from("data/hist.json"),
            allow_empty: false,
            base_url: "http://localhost:5000".to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            request_timeout_ms: 2000,
            include_history: true,
            log_level: "info".to_string(),
        }
    }

    pub fn with_file(self, path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.with_toml(&content)
    }

    pub fn with_toml(self, content: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(content)?;

        Ok(Self {
            port: file.port.unwrap_or(self.port),
            live_path: file.live_path.unwrap_or(self.live_path),
            history_path: file.history_path.unwrap_or(self.history_path),
            allow_empty: file.allow_empty.unwrap_or(self.allow_empty),
            base_url: file.base_url.unwrap_or(self.base_url),
            poll_interval_ms: file.poll_interval_ms.unwrap_or(self.poll_interval_ms),
            request_timeout_ms: file.request_timeout_ms.unwrap_or(self.request_timeout_ms),
            include_history: file.include_history.unwrap_or(self.include_history),
            log_level: file.log_level.unwrap_or(self.log_level),
        })
    }

    /// Apply `SOLARDASH_*` variables; unparsable values are ignored
    pub fn with_env(self, var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: parsed(&var, "SOLARDASH_PORT").unwrap_or(self.port),
            live_path: var("SOLARDASH_LIVE_PATH")
                .map(PathBuf::from)
                .unwrap_or(self.live_path),
            history_path: var("SOLARDASH_HISTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or(self.history_path),
            allow_empty: parsed(&var, "SOLARDASH_ALLOW_EMPTY").unwrap_or(self.allow_empty),
            base_url: var("SOLARDASH_BASE_URL").unwrap_or(self.base_url),
            poll_interval_ms: parsed(&var, "SOLARDASH_POLL_INTERVAL_MS").unwrap_or(self.poll_interval_ms),
            request_timeout_ms: parsed(&var, "SOLARDASH_REQUEST_TIMEOUT_MS")
                .unwrap_or(self.request_timeout_ms),
            include_history: parsed(&var, "SOLARDASH_INCLUDE_HISTORY").unwrap_or(self.include_history),
            log_level: var("SOLARDASH_LOG_LEVEL").unwrap_or(self.log_level),
        }
    }

    pub fn polling(&self) -> PollingConfig {
        PollingConfig {
            include_history: self.include_history,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parsed<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::defaults();
        assert_eq!(config.port, 5000);
        assert_eq!(config.poll_interval(), Duration::from_millis(3000));
        assert!(config.polling().include_history);
        assert!(!config.allow_empty);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::defaults().with_env(env_of(&[
            ("SOLARDASH_PORT", "8080"),
            ("SOLARDASH_POLL_INTERVAL_MS", "500"),
            ("SOLARDASH_ALLOW_EMPTY", "true"),
            ("SOLARDASH_BASE_URL", "http://10.0.0.2:5000"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert!(config.allow_empty);
        assert_eq!(config.base_url, "http://10.0.0.2:5000");
    }

    #[test]
    fn test_env_ignores_unparsable() {
        let config = Config::defaults().with_env(env_of(&[("SOLARDASH_PORT", "not-a-port")]));
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn test_toml_then_env() {
        let config = Config::defaults()
            .with_toml(
                r#"
                port = 7000
                live_path = "/srv/live.json"
                include_history = false
                "#,
            )
            .unwrap()
            .with_env(env_of(&[("SOLARDASH_PORT", "7100")]));

        assert_eq!(config.port, 7100);
        assert_eq!(config.live_path, PathBuf::from("/srv/live.json"));
        assert!(!config.include_history);
        assert_eq!(config.history_path, PathBuf::from("data/hist.json"));
    }

    #[test]
    fn test_toml_rejects_unknown_keys() {
        let err = Config::defaults().with_toml("prot = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::defaults()
            .with_file(Path::new("/nonexistent/solardash.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
