//! Database schema definitions and SQL constants.

/// Current schema version for the database.
///
/// Stored in the metadata table and checked on every open.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Key-value table holding the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// Parking slots. Codes are unique.
pub const CREATE_SLOTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS slots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        code TEXT NOT NULL UNIQUE,
        vehicle_type TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1,
        assignment_mode TEXT NOT NULL
    )";

/// Reservation rows.
///
/// `turn` holds `Morning` or `Afternoon`; any other value is read as a
/// full-day marker. Dates are ISO-8601 text so they compare correctly as
/// strings.
pub const CREATE_RESERVATIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS reservations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        slot_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        turn TEXT NOT NULL,
        vehicle_type TEXT NOT NULL,
        requester_email TEXT NOT NULL,
        requester_name TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )";

/// The settings singleton.
pub const CREATE_SETTINGS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS settings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        visible_days INTEGER NOT NULL,
        morning_start INTEGER NOT NULL,
        morning_end INTEGER NOT NULL,
        afternoon_start INTEGER NOT NULL,
        afternoon_end INTEGER NOT NULL
    )";

/// Speeds up slot capacity counts.
pub const CREATE_SLOT_DATE_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_reservations_slot_date
    ON reservations(slot_id, date, turn, status)";

/// Speeds up the one-booking-per-requester check.
pub const CREATE_REQUESTER_DATE_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_reservations_requester_date
    ON reservations(requester_email, date, turn, status)";

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version in the metadata table.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";

pub const SLOT_COLUMNS: &str = "id, code, vehicle_type, active, assignment_mode";

pub const INSERT_SLOT: &str = r"
    INSERT INTO slots (code, vehicle_type, active, assignment_mode)
    VALUES (?, ?, ?, ?)
";

pub const UPDATE_SLOT: &str = r"
    UPDATE slots
    SET code = ?, vehicle_type = ?, active = ?, assignment_mode = ?
    WHERE id = ?
";

pub const RESERVATION_COLUMNS: &str = "id, slot_id, date, turn, vehicle_type, \
     requester_email, requester_name, status, created_at";

pub const INSERT_RESERVATION: &str = r"
    INSERT INTO reservations
    (slot_id, date, turn, vehicle_type, requester_email, requester_name, status, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";

pub const UPDATE_RESERVATION_STATUS: &str = "UPDATE reservations SET status = ? WHERE id = ?";

pub const SETTINGS_COLUMNS: &str =
    "id, visible_days, morning_start, morning_end, afternoon_start, afternoon_end";

pub const INSERT_SETTINGS: &str = r"
    INSERT INTO settings
    (visible_days, morning_start, morning_end, afternoon_start, afternoon_end)
    VALUES (?, ?, ?, ?, ?)
";

pub const UPDATE_SETTINGS: &str = r"
    UPDATE settings
    SET visible_days = ?, morning_start = ?, morning_end = ?,
        afternoon_start = ?, afternoon_end = ?
    WHERE id = ?
";
