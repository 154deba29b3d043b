//! `SQLite` storage back-end.
//!
//! [`Database`] implements [`ListStore`](crate::store::ListStore) for slots,
//! reservations and settings. Typed queries are rendered to parameterized
//! SQL, the journal runs in WAL mode, and every write takes the database
//! lock up front with an IMMEDIATE transaction.
//!
//! # Examples
//!
//! ```no_run
//! use parkbook::database::{Database, DatabaseConfig};
//! use parkbook::slot::catalog::SlotCatalog;
//! use parkbook::{AssignmentMode, NewSlot, VehicleType};
//!
//! let db = Database::open(DatabaseConfig::new("/tmp/parkbook.db")).unwrap();
//! let catalog = SlotCatalog::new(&db);
//! catalog
//!     .add(NewSlot::new("A-01", VehicleType::Car, AssignmentMode::Itinerant).unwrap())
//!     .unwrap();
//! for slot in catalog.list_all().unwrap() {
//!     println!("{} {}", slot.code, slot.vehicle_type);
//! }
//! ```

mod config;
mod connection;
pub mod migrations;
mod operations;
mod schema;
mod sql;

pub use config::{
    default_data_dir, resolve_data_dir, resolve_database_path, DatabaseConfig, DATABASE_FILE,
    DATA_DIR_ENV,
};
pub use connection::Database;

pub use migrations::{check_schema_compatibility, get_schema_version, initialize_schema};
