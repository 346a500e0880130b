//! JSON file configuration store.
//!
//! Implements [`ConfigPort`] over a single JSON file.  A missing file
//! yields [`SystemConfig::default()`]; fields absent from the file take
//! their defaults (`#[serde(default)]`).  Configs are validated on both
//! load and save.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "ConfigFile: {} not found, using defaults",
                    self.path.display()
                );
                return Ok(SystemConfig::default());
            }
            Err(e) => {
                warn!("ConfigFile: reading {} failed: {}", self.path.display(), e);
                return Err(ConfigError::IoError);
            }
        };

        let config: SystemConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("ConfigFile: {} is not valid: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        info!("ConfigFile: loaded {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::IoError)?;
        fs::write(&self.path, text).map_err(|e| {
            warn!("ConfigFile: writing {} failed: {}", self.path.display(), e);
            ConfigError::IoError
        })?;
        info!("ConfigFile: saved {}", self.path.display());
        Ok(())
    }
}
