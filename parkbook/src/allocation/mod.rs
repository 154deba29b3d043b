//! Slot allocation.
//!
//! [`AllocationEngine`] turns an [`AllocationRequest`] into reservation rows
//! or a refusal that names the vehicle type, date and turn.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use parkbook::allocation::{AllocationEngine, AllocationPolicy, AllocationRequest};
//! use parkbook::slot::catalog::SlotCatalog;
//! use parkbook::store::MemoryStore;
//! use parkbook::{AssignmentMode, Error, NewSlot, Turn, VehicleType};
//!
//! let store = MemoryStore::new();
//! SlotCatalog::new(&store)
//!     .add(NewSlot::new("A-01", VehicleType::Car, AssignmentMode::Itinerant).unwrap())
//!     .unwrap();
//! let engine = AllocationEngine::new(&store, AllocationPolicy::default());
//! let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
//!
//! let alice = AllocationRequest::new(VehicleType::Car, Turn::Morning, today, "alice@x.com", "Alice")
//!     .unwrap();
//! engine.allocate(&alice, today).unwrap();
//!
//! let bob = AllocationRequest::new(VehicleType::Car, Turn::Morning, today, "bob@x.com", "Bob")
//!     .unwrap();
//! let refusal = engine.allocate(&bob, today).unwrap_err();
//! assert!(matches!(refusal, Error::NoAvailability { .. }));
//! assert_eq!(
//!     refusal.user_message(),
//!     "No Car slot is free on 2025-03-10 for the Morning turn."
//! );
//! ```

pub mod engine;
pub mod request;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use engine::AllocationEngine;
pub use request::{Allocation, AllocationPolicy, AllocationRequest, AllocationState};
