//! Schema creation and version gate.
//!
//! A database file carries its schema version in the `metadata` table. An
//! empty file gets the current schema; a file written by a different
//! version is refused rather than guessed at.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Error, Result};

use super::schema::{
    CREATE_METADATA_TABLE, CREATE_REQUESTER_DATE_INDEX, CREATE_RESERVATIONS_TABLE,
    CREATE_SETTINGS_TABLE, CREATE_SLOTS_TABLE, CREATE_SLOT_DATE_INDEX, CURRENT_SCHEMA_VERSION,
    INSERT_SCHEMA_VERSION, SELECT_SCHEMA_VERSION,
};

/// Statements making up the current schema, in creation order.
const SCHEMA: [&str; 6] = [
    CREATE_METADATA_TABLE,
    CREATE_SLOTS_TABLE,
    CREATE_RESERVATIONS_TABLE,
    CREATE_SETTINGS_TABLE,
    CREATE_SLOT_DATE_INDEX,
    CREATE_REQUESTER_DATE_INDEX,
];

/// Creates every table and index, then stamps the schema version.
///
/// Runs inside one transaction so a half-built schema is never left behind.
///
/// ```
/// use rusqlite::Connection;
/// use parkbook::database::migrations::{get_schema_version, initialize_schema};
///
/// let conn = Connection::open_in_memory().unwrap();
/// initialize_schema(&conn).unwrap();
/// assert_eq!(get_schema_version(&conn).unwrap(), 1);
/// ```
///
/// # Errors
///
/// Returns the `SQLite` error of the first statement that fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for statement in SCHEMA {
        tx.execute(statement, [])?;
    }
    tx.execute(INSERT_SCHEMA_VERSION, [CURRENT_SCHEMA_VERSION])?;
    tx.commit()?;
    Ok(())
}

fn has_metadata_table(conn: &Connection) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'metadata'",
            [],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Reads the stamped schema version; 0 means the file was never initialized.
///
/// # Errors
///
/// Returns an error if the query fails or the stored value is not a number.
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    if !has_metadata_table(conn)? {
        return Ok(0);
    }
    let stored: Option<String> = conn
        .query_row(SELECT_SCHEMA_VERSION, [], |row| row.get(0))
        .optional()?;
    match stored {
        None => Ok(0),
        Some(text) => text.trim().parse().map_err(|_| Error::Validation {
            field: "schema_version".into(),
            message: format!("stored schema version '{text}' is not a number"),
        }),
    }
}

/// Initializes an empty database or verifies an existing one.
///
/// # Errors
///
/// Returns [`Error::UnsupportedSchemaVersion`] when the file was written by a
/// different schema version.
pub fn check_schema_compatibility(conn: &Connection) -> Result<()> {
    match get_schema_version(conn)? {
        0 => {
            log::debug!("creating parkbook schema v{CURRENT_SCHEMA_VERSION}");
            initialize_schema(conn)
        }
        CURRENT_SCHEMA_VERSION => Ok(()),
        found => Err(Error::UnsupportedSchemaVersion {
            expected: CURRENT_SCHEMA_VERSION,
            found,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_rows(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_fresh_schema_is_empty_and_stamped() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
        assert_eq!(table_rows(&conn, "slots"), 0);
        assert_eq!(table_rows(&conn, "reservations"), 0);
        assert_eq!(table_rows(&conn, "settings"), 0);

        let indices: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_reservations_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indices, 2);
    }

    #[test]
    fn test_blank_file_reports_version_zero() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);

        conn.execute(CREATE_METADATA_TABLE, []).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn test_compatibility_check_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        check_schema_compatibility(&conn).unwrap();
        check_schema_compatibility(&conn).unwrap();
        assert_eq!(table_rows(&conn, "metadata"), 1);
    }

    #[test]
    fn test_other_version_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "UPDATE metadata SET value = '999' WHERE key = 'schema_version'",
            [],
        )
        .unwrap();

        assert!(matches!(
            check_schema_compatibility(&conn),
            Err(Error::UnsupportedSchemaVersion { found: 999, .. })
        ));
    }

    #[test]
    fn test_garbled_version_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "UPDATE metadata SET value = 'one' WHERE key = 'schema_version'",
            [],
        )
        .unwrap();

        assert!(matches!(
            get_schema_version(&conn),
            Err(Error::Validation { .. })
        ));
    }
}
