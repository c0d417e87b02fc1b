//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] on top of a single JSON document. A missing
//! file means "use the defaults"; anything that fails to parse or to
//! validate is reported, never patched up.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

/// [`ConfigPort`] backed by a JSON file on the host.
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
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("ConfigFile: {} not found, using defaults", self.path.display());
                return Ok(SystemConfig::default());
            }
            Err(_) => return Err(ConfigError::IoError),
        };
        let config: SystemConfig =
            serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        info!("ConfigFile: loaded {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        fs::write(&self.path, text).map_err(|_| ConfigError::IoError)?;
        info!("ConfigFile: saved {}", self.path.display());
        Ok(())
    }
}
