//! Configuration file discovery and loading.

use crate::config::schema::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// A loaded configuration file.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Where the file was read from.
    pub path: PathBuf,
    /// Merge order; higher values win.
    pub precedence: u8,
    /// The parsed contents.
    pub config: Config,
}

/// Loads configuration files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads every configuration file that exists for `data_dir`, lowest
    /// precedence first.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed.
    pub fn load_all(data_dir: &Path) -> Result<Vec<ConfigSource>> {
        let mut sources = Vec::new();

        let config_path = data_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let config = Self::load_file(&config_path)?;
            sources.push(ConfigSource {
                path: config_path,
                precedence: 1,
                config,
            });
        }

        Ok(sources)
    }

    /// Reads and parses one YAML file.
    ///
    /// An empty file parses as the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid
    /// configuration YAML.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path)?;
        let invalid = |e: serde_yaml::Error| Error::Validation {
            field: path.display().to_string(),
            message: format!("invalid configuration: {e}"),
        };

        // Blank or comment-only files parse to null
        let document: serde_yaml::Value = serde_yaml::from_str(&contents).map_err(invalid)?;
        if document.is_null() {
            return Ok(Config::default());
        }
        serde_yaml::from_value(document).map_err(invalid)
    }
}
