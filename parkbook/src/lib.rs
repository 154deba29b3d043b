#![deny(unsafe_code)]
#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # parkbook
//!
//! A library for allocating shared parking slots across daily turns.
//!
//! Slots are typed by vehicle (car or motorcycle) and assignment mode.
//! Requesters book a morning, an afternoon or a full day; the
//! [`allocation::AllocationEngine`] picks the first itinerant slot with room
//! and refuses, with a reason naming the vehicle type, date and turn, when
//! there is none.
//!
//! ## Core Types
//!
//! - [`Slot`], [`VehicleType`] and [`AssignmentMode`]: the physical pool
//! - [`Reservation`] and [`Turn`]: who holds what, when
//! - [`Settings`], [`TurnBounds`] and [`BookingWindow`]: administrative settings
//! - [`store::ListStore`]: the data-access seam, implemented by
//!   [`Database`] (SQLite) and [`store::MemoryStore`]
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use parkbook::allocation::{AllocationEngine, AllocationPolicy, AllocationRequest};
//! use parkbook::slot::catalog::SlotCatalog;
//! use parkbook::store::MemoryStore;
//! use parkbook::{AssignmentMode, NewSlot, Turn, VehicleType};
//!
//! let store = MemoryStore::new();
//! SlotCatalog::new(&store)
//!     .add(NewSlot::new("M-01", VehicleType::Motorcycle, AssignmentMode::Itinerant).unwrap())
//!     .unwrap();
//!
//! let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
//! let engine = AllocationEngine::new(&store, AllocationPolicy::default());
//! let request = AllocationRequest::new(
//!     VehicleType::Motorcycle, Turn::FullDay, today, "alice@x.com", "Alice",
//! )
//! .unwrap();
//!
//! let allocation = engine.allocate(&request, today).unwrap();
//! assert_eq!(allocation.slot_code, "M-01");
//! assert_eq!(allocation.reservations.len(), 2);
//! ```

pub mod allocation;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod occupancy;
pub mod reservation;
pub mod settings;
pub mod slot;
pub mod store;

// Re-export key types at crate root for convenience
pub use allocation::{Allocation, AllocationEngine, AllocationPolicy, AllocationRequest};
pub use config::{Config, ConfigBuilder};
pub use database::{Database, DatabaseConfig};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use occupancy::{OccupancyAggregator, OccupancySnapshot};
pub use reservation::{
    NewReservation, Reservation, ReservationId, ReservationStatus, Turn,
};
pub use settings::{BookingWindow, NewSettings, Settings, TurnBounds};
pub use slot::{AssignmentMode, Capacities, NewSlot, Slot, SlotId, SlotPatch, VehicleType};
