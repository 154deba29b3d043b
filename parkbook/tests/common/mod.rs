//! Common test utilities for integration tests.
//!
//! Fixtures for seeding slots and building requests against either store
//! back-end.

use chrono::NaiveDate;
use parkbook::database::{Database, DatabaseConfig};
use parkbook::slot::catalog::SlotCatalog;
use parkbook::store::ListStore;
use parkbook::{AllocationRequest, AssignmentMode, NewSlot, Slot, Turn, VehicleType};

/// Monday 10 March 2025, the reference day of every scenario.
#[allow(dead_code)]
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

/// Creates a test database in a temporary location.
///
/// The temporary directory is leaked so it outlives the returned handle.
#[allow(dead_code)]
pub fn create_test_database() -> Database {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = Database::open(DatabaseConfig::new(path)).unwrap();
    std::mem::forget(dir);
    db
}

/// Adds an active slot.
#[allow(dead_code)]
pub fn add_slot<S>(store: &S, code: &str, vehicle_type: VehicleType, mode: AssignmentMode) -> Slot
where
    S: ListStore<Slot> + ?Sized,
{
    SlotCatalog::new(store)
        .add(NewSlot::new(code, vehicle_type, mode).unwrap())
        .unwrap()
}

/// Adds an active itinerant slot.
#[allow(dead_code)]
pub fn add_itinerant<S>(store: &S, code: &str, vehicle_type: VehicleType) -> Slot
where
    S: ListStore<Slot> + ?Sized,
{
    add_slot(store, code, vehicle_type, AssignmentMode::Itinerant)
}

/// Request for `today()` by `email`, using the local part as display name.
#[allow(dead_code)]
pub fn request(vehicle_type: VehicleType, turn: Turn, email: &str) -> AllocationRequest {
    let name = email.split('@').next().unwrap_or(email);
    AllocationRequest::new(vehicle_type, turn, today(), email, name).unwrap()
}
