//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] on a single JSON document. A missing file
//! means defaults; a present but unparsable one is `Corrupted`. Writes go
//! to a sibling temp file first and are renamed into place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::DetectorConfig;
use crate::error::Error;

/// Configuration for one run: the file at `path` when given, defaults
/// otherwise. Either way the result has passed validation.
pub fn load_config(path: Option<&Path>) -> crate::Result<DetectorConfig> {
    let config = match path {
        Some(path) => JsonConfigFile::new(path).load()?,
        None => DetectorConfig::default(),
    };
    config.validate().map_err(Error::Config)?;
    Ok(config)
}

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<DetectorConfig, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Config: {} not found, using defaults", self.path.display());
                return Ok(DetectorConfig::default());
            }
            Err(e) => {
                warn!("Config: {}: {}", self.path.display(), e);
                return Err(ConfigError::IoError);
            }
        };
        let config: DetectorConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("Config: {}: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate().map_err(ConfigError::ValidationFailed)?;
        info!("Config: loaded {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &DetectorConfig) -> Result<(), ConfigError> {
        config.validate().map_err(ConfigError::ValidationFailed)?;
        let json = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|_| ConfigError::IoError)?;
        std::fs::rename(&tmp, &self.path).map_err(|_| ConfigError::IoError)?;
        info!("Config: saved {}", self.path.display());
        Ok(())
    }
}
