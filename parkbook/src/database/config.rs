//! Where the database lives and how it is opened.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Overrides the data directory when set to a non-empty value.
pub const DATA_DIR_ENV: &str = "PARKBOOK_DATA_DIR";

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "parkbook.db";

/// How long a writer waits on another writer's lock unless told otherwise.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_DIR_NAME: &str = ".parkbook";

/// Open parameters for [`Database`](super::Database).
///
/// ```
/// use parkbook::database::DatabaseConfig;
/// use std::time::Duration;
///
/// let config = DatabaseConfig::new("/srv/parking/parkbook.db")
///     .with_busy_timeout(Duration::from_secs(10))
///     .without_auto_create();
/// assert_eq!(config.busy_timeout, Duration::from_secs(10));
/// assert!(!config.auto_create);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database file.
    pub path: PathBuf,
    /// Lock wait before a write gives up with `LockTimeout`.
    pub busy_timeout: Duration,
    /// Create the file (and its parent directory) when it does not exist.
    pub auto_create: bool,
    /// Open without write access.
    pub read_only: bool,
}

impl DatabaseConfig {
    /// Read-write, auto-creating, with [`DEFAULT_BUSY_TIMEOUT`].
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            auto_create: true,
            read_only: false,
        }
    }

    /// Replaces the lock wait.
    #[must_use]
    pub fn with_busy_timeout(self, busy_timeout: Duration) -> Self {
        Self {
            busy_timeout,
            ..self
        }
    }

    /// Fails with `DataDirectoryNotFound` instead of creating a missing file.
    #[must_use]
    pub fn without_auto_create(self) -> Self {
        Self {
            auto_create: false,
            ..self
        }
    }

    /// Opens for reading only; a read-only open never creates anything.
    #[must_use]
    pub fn read_only(self) -> Self {
        Self {
            read_only: true,
            auto_create: false,
            ..self
        }
    }
}

/// `~/.parkbook`.
///
/// # Errors
///
/// Fails when the platform reports no home directory.
pub fn default_data_dir() -> Result<PathBuf> {
    let home = home::home_dir().ok_or_else(|| Error::Validation {
        field: "home_directory".into(),
        message: format!("no home directory to place {DEFAULT_DIR_NAME} in; set {DATA_DIR_ENV}"),
    })?;
    Ok(home.join(DEFAULT_DIR_NAME))
}

/// `$PARKBOOK_DATA_DIR`, or [`default_data_dir`] when unset or empty.
///
/// # Errors
///
/// Fails only when falling back to the home directory and there is none.
pub fn resolve_data_dir() -> Result<PathBuf> {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map_or_else(default_data_dir, |dir| Ok(PathBuf::from(dir)))
}

/// [`DATABASE_FILE`] inside [`resolve_data_dir`].
///
/// # Errors
///
/// See [`resolve_data_dir`].
pub fn resolve_database_path() -> Result<PathBuf> {
    resolve_data_dir().map(|dir| dir.join(DATABASE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::new("parkbook.db");
        assert_eq!(config.busy_timeout, DEFAULT_BUSY_TIMEOUT);
        assert!(config.auto_create);
        assert!(!config.read_only);
    }

    #[test]
    fn test_read_only_never_creates() {
        let config = DatabaseConfig::new("parkbook.db").read_only();
        assert!(config.read_only);
        assert!(!config.auto_create);
        assert_eq!(config.path, PathBuf::from("parkbook.db"));
    }

    #[test]
    #[serial]
    fn test_data_dir_from_environment() {
        let saved = std::env::var_os(DATA_DIR_ENV);

        std::env::set_var(DATA_DIR_ENV, "/srv/parking");
        assert_eq!(
            resolve_database_path().unwrap(),
            PathBuf::from("/srv/parking/parkbook.db")
        );

        std::env::set_var(DATA_DIR_ENV, "");
        if home::home_dir().is_some() {
            assert!(resolve_data_dir().unwrap().ends_with(DEFAULT_DIR_NAME));
        }

        match saved {
            Some(value) => std::env::set_var(DATA_DIR_ENV, value),
            None => std::env::remove_var(DATA_DIR_ENV),
        }
    }
}
