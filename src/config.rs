// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Configuration for locating the job database.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{OverlayError, Result};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "POSE_OVERLAY_CONFIG";

/// Default config file name, resolved under the home directory.
pub const DEFAULT_CONFIG_FILE: &str = ".pose-overlay.toml";

/// Tool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Root directory of the job database.
    pub db_path: PathBuf,
}

impl Config {
    /// Build a config directly from a database root.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(db_path: P) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Parse a config file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            OverlayError::ConfigError(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&text).map_err(|e| {
            OverlayError::ConfigError(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Load the config from `$POSE_OVERLAY_CONFIG`, falling back to
    /// `~/.pose-overlay.toml`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if no config file can be located or parsed.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        let home = dirs::home_dir().ok_or_else(|| {
            OverlayError::ConfigError("could not determine home directory".to_string())
        })?;
        Self::from_path(&home.join(DEFAULT_CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str("db_path = \"/data/jobs\"").unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/jobs"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_path(Path::new("/nonexistent/pose-overlay.toml")).unwrap_err();
        assert!(matches!(err, OverlayError::ConfigError(_)));
    }
}
