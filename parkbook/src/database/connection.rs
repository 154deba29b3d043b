//! The `SQLite` handle and its write-lock discipline.

use rusqlite::{Connection, ErrorCode, OpenFlags, Transaction, TransactionBehavior};

use crate::error::{Error, Result};

use super::config::DatabaseConfig;

/// One open parkbook database.
///
/// Each process (or thread) that books concurrently opens its own
/// `Database`; `SQLite` arbitrates between them through the file lock.
///
/// ```no_run
/// use parkbook::database::{Database, DatabaseConfig};
///
/// let db = Database::open(DatabaseConfig::new("/srv/parking/parkbook.db")).unwrap();
/// assert!(db.config().auto_create);
/// ```
#[derive(Debug)]
pub struct Database {
    pub(super) conn: Connection,
    config: DatabaseConfig,
}

fn open_flags(config: &DatabaseConfig) -> OpenFlags {
    let access = if config.read_only {
        OpenFlags::SQLITE_OPEN_READ_ONLY
    } else if config.auto_create {
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
    } else {
        OpenFlags::SQLITE_OPEN_READ_WRITE
    };
    access | OpenFlags::SQLITE_OPEN_NO_MUTEX
}

impl Database {
    /// Opens (and when allowed, creates) the database described by `config`.
    ///
    /// Writers get a WAL journal so readers never block them. The schema is
    /// created on first open and version-checked on every later one.
    ///
    /// # Errors
    ///
    /// - [`Error::DataDirectoryNotFound`] when the file is missing and
    ///   creation is off
    /// - [`Error::UnsupportedSchemaVersion`] for a file from another version
    /// - I/O and `SQLite` errors from creating or opening the file
    pub fn open(config: DatabaseConfig) -> Result<Self> {
        if !config.path.exists() {
            if !config.auto_create {
                return Err(Error::DataDirectoryNotFound {
                    path: config.path.clone(),
                });
            }
            if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(&config.path, open_flags(&config))?;
        conn.busy_timeout(config.busy_timeout)?;
        if !config.read_only {
            let _: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
        }
        super::migrations::check_schema_compatibility(&conn)?;

        log::debug!(
            "opened {} (busy timeout {:?})",
            config.path.display(),
            config.busy_timeout
        );
        Ok(Self { conn, config })
    }

    /// Raw connection, for schema inspection and tests.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Parameters this handle was opened with.
    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Begins a write transaction that takes the write lock up front.
    ///
    /// Only the write itself is serialized. Conflict reads run before it,
    /// outside any transaction, so concurrent bookings can still both pass
    /// their checks; the engine's post-write re-count settles that.
    pub(super) fn immediate(&self) -> Result<Transaction<'_>> {
        Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .map_err(|e| self.map_busy(e))
    }

    /// Reports lock contention as [`Error::LockTimeout`]; everything else
    /// passes through as a database error.
    pub(super) fn map_busy(&self, err: rusqlite::Error) -> Error {
        let contended = matches!(
            err.sqlite_error_code(),
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
        );
        if contended {
            Error::LockTimeout {
                seconds: self.config.busy_timeout.as_secs(),
            }
        } else {
            Error::Database(err)
        }
    }
}
