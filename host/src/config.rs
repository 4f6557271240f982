//! Host configuration loaded from a TOML file.
//!
//! Every field is optional; routines from the file are merged over the
//! built-in ones.
//!
//! ```toml
//! port = "/dev/ttyACM0"
//! store_path = "poses.json"
//!
//! [[routines.wave.steps]]
//! pose = "wave1"
//! hold_ms = 300
//! ```
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use quadruped_link::config::BAUD_RATE;
use serde::Deserialize;
use thiserror::Error;

use crate::routine::Routine;
use crate::transport::DEFAULT_PORT;

pub const DEFAULT_STORE_PATH: &str = "poses.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Couldn't read the config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Error in config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub port: String,
    pub baud_rate: u32,
    pub store_path: PathBuf,
    pub routines: BTreeMap<String, Routine>,
}

/// On-disk shape; absent fields fall back to [`HostConfig::default`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    port: Option<String>,
    store_path: Option<PathBuf>,
    #[serde(default)]
    routines: BTreeMap<String, Routine>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: BAUD_RATE,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            routines: Routine::builtin(),
        }
    }
}

impl HostConfig {
    /// Loads `path`, or the defaults when the file does not exist.
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(port) = file.port {
            config.port = port;
        }
        if let Some(store_path) = file.store_path {
            config.store_path = store_path;
        }
        for (name, routine) in file.routines {
            debug!("Routine {name} from config ({} steps)", routine.steps.len());
            config.routines.insert(name, routine);
        }
        Ok(config)
    }
}
