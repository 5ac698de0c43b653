//! # Configuration Management
//!
//! Display settings handed to the formatting functions on every call: one unit
//! choice per quantity plus the rounding flag. Loaded from a TOML file such as:
//!
//! ```toml
//! round = true
//!
//! [units]
//! temperature = "fahrenheit"
//! windspeed = "mph"
//! apparent_temperature = "windchill_humidex"
//! ```
//!
//! Missing keys take their defaults, so an empty file is a valid config.

use crate::units::UnitsConfig;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors reading a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Display configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Unit selection per quantity
    pub units: UnitsConfig,
    /// Print values without decimals
    pub round: bool,
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from `path`, surfacing IO and format errors.
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load_from_path(path) {
            Ok(config) => {
                info!("loaded display configuration from {}", path.display());
                config
            }
            Err(ConfigError::Io(err)) => {
                info!("no config at {} ({err}), using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                warn!("{err} in {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
