use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::format::OutputFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Defaults read from `config.toml`. Command line flags take precedence.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Calendar exported when `--calendar` is not given
    pub calendar: Option<String>,
    /// Days to export including today
    pub days: Option<u32>,
    pub output: Option<OutputFormat>,
    /// Log filter used when neither `RUST_LOG` nor `-v` is set
    pub log_level: Option<String>,
}

impl Config {
    /// `<config dir>/calexport/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("calexport").join("config.toml"))
    }

    /// Loads `explicit` if given, which must exist. Otherwise the default
    /// location is tried and a missing file yields an empty config.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };
        match Self::read(&path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file");
                Ok(Self::default())
            }
            other => other,
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
