use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{QuerypadError, Result};

/// Top-level configuration for the Querypad application.
///
/// Loaded from `~/.querypad/config.toml` by default. The `[remote]` section
/// decides where query data lives: when both connection parameters are set,
/// the storage layer targets the hosted backend, otherwise the on-device
/// store is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerypadConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl QuerypadConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: QuerypadConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| QuerypadError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the on-device store and API token file.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// API server port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.querypad/data".to_string(),
            log_level: "info".to_string(),
            port: 3040,
        }
    }
}

/// Hosted backend connection settings.
///
/// Both parameters are required for the remote adapter to be considered;
/// leaving either empty selects the on-device store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the hosted Querypad API, e.g. "https://api.example.com".
    pub url: String,
    /// Bearer token presented on every request.
    pub api_key: String,
}

impl RemoteConfig {
    /// True when both connection parameters are present.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = QuerypadConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.port, 3040);
        assert!(!config.remote.is_configured());
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(
            r#"
            [general]
            data_dir = "/tmp/querypad"
            log_level = "debug"
            port = 8080

            [remote]
            url = "https://api.example.com"
            api_key = "secret"
            "#,
        );
        let config = QuerypadConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/tmp/querypad");
        assert_eq!(config.general.port, 8080);
        assert!(config.remote.is_configured());
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let file = create_temp_config(
            r#"
            [remote]
            url = "https://api.example.com"
            "#,
        );
        let config = QuerypadConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "info");
        // api_key missing: remote is not considered configured.
        assert!(!config.remote.is_configured());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = QuerypadConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_load_or_default_malformed_file() {
        let file = create_temp_config("this is not toml [[[");
        let config = QuerypadConfig::load_or_default(file.path());
        assert_eq!(config.general.port, 3040);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = QuerypadConfig::default();
        config.remote.url = "https://api.example.com".to_string();
        config.remote.api_key = "k".to_string();
        config.save(&path).unwrap();

        let reloaded = QuerypadConfig::load(&path).unwrap();
        assert_eq!(reloaded.remote.url, "https://api.example.com");
        assert!(reloaded.remote.is_configured());
    }

    #[test]
    fn test_remote_is_configured_requires_both_parameters() {
        let mut remote = RemoteConfig::default();
        assert!(!remote.is_configured());

        remote.url = "https://api.example.com".to_string();
        assert!(!remote.is_configured());

        remote.api_key = "secret".to_string();
        assert!(remote.is_configured());

        remote.url = "   ".to_string();
        assert!(!remote.is_configured());
    }
}
