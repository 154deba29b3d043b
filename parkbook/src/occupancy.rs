//! Occupancy snapshots.
//!
//! A snapshot answers "who is parked where" for one date: per-slot counts
//! for each turn and per-vehicle-type totals for the turn that is running
//! now. Nothing is stored; every snapshot is computed from the slot catalog
//! and the active reservations of the day.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::Result;
use crate::reservation::store::ReservationStore;
use crate::reservation::Turn;
use crate::settings::reader::SettingsReader;
use crate::settings::TurnBounds;
use crate::slot::catalog::{SlotCatalog, SlotFilter};
use crate::slot::{AssignmentMode, Capacities, SlotId, VehicleType};
use crate::store::DataStore;

/// Someone holding a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occupant {
    /// Display name.
    pub name: String,
    /// E-mail, lower-cased.
    pub email: String,
    /// Turn held, as stored.
    pub turn: Turn,
}

/// Occupancy of one slot on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotOccupancy {
    /// Slot code.
    pub code: String,
    /// Vehicle type of the slot.
    pub vehicle_type: VehicleType,
    /// Assignment mode of the slot.
    pub assignment_mode: AssignmentMode,
    /// Active reservations the slot can hold per turn.
    pub capacity: usize,
    /// Active reservations occupying the morning.
    pub morning_count: usize,
    /// Active reservations occupying the afternoon.
    pub afternoon_count: usize,
    /// At least one reservation holds the morning.
    pub morning_occupied: bool,
    /// At least one reservation holds the afternoon.
    pub afternoon_occupied: bool,
    /// Name to display for the slot: an occupant of the current turn if
    /// there is one, else the first occupant of the day.
    pub occupant_name: Option<String>,
    /// Everyone holding the slot that day, in booking order.
    pub occupants: Vec<Occupant>,
}

impl SlotOccupancy {
    /// Reservations counted against the slot right now.
    ///
    /// Outside both turns this is the busier of the two.
    #[must_use]
    pub fn used_now(&self, current_turn: Option<Turn>) -> usize {
        let used = match current_turn {
            Some(Turn::Morning) => self.morning_count,
            Some(Turn::Afternoon) => self.afternoon_count,
            Some(Turn::FullDay) | None => self.morning_count.max(self.afternoon_count),
        };
        used.min(self.capacity)
    }

    /// Whether the slot is taken right now.
    ///
    /// Outside both turns a slot is taken if either turn is.
    #[must_use]
    pub fn occupied_now(&self, current_turn: Option<Turn>) -> bool {
        match current_turn {
            Some(Turn::Morning) => self.morning_occupied,
            Some(Turn::Afternoon) => self.afternoon_occupied,
            Some(Turn::FullDay) | None => self.morning_occupied || self.afternoon_occupied,
        }
    }
}

/// Totals for one vehicle type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VehicleOccupancy {
    /// Active slots of this type.
    pub slots: usize,
    /// Places across those slots.
    pub capacity: usize,
    /// Places taken now.
    pub used_now: usize,
    /// Places free now.
    pub free_now: usize,
    /// Slots with at least one occupant now.
    pub occupied_slots_now: usize,
}

/// Occupancy of every active slot on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupancySnapshot {
    /// The date described.
    pub date: NaiveDate,
    /// Turn running at the snapshot time, if any.
    pub current_turn: Option<Turn>,
    /// Per-slot detail.
    pub per_slot: BTreeMap<SlotId, SlotOccupancy>,
    /// Per-vehicle-type totals. Every vehicle type is present.
    pub by_vehicle: BTreeMap<VehicleType, VehicleOccupancy>,
}

/// Computes occupancy snapshots.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use parkbook::occupancy::OccupancyAggregator;
/// use parkbook::reservation::store::ReservationStore;
/// use parkbook::slot::catalog::SlotCatalog;
/// use parkbook::store::MemoryStore;
/// use parkbook::{
///     AssignmentMode, Capacities, NewReservation, NewSlot, Turn, TurnBounds, VehicleType,
/// };
///
/// let store = MemoryStore::new();
/// let slot = SlotCatalog::new(&store)
///     .add(NewSlot::new("A-02", VehicleType::Car, AssignmentMode::Itinerant).unwrap())
///     .unwrap();
/// let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// ReservationStore::new(&store)
///     .create(
///         NewReservation::new(slot.id, date, Turn::Morning, VehicleType::Car, "a@x.com", "Alice")
///             .unwrap(),
///     )
///     .unwrap();
///
/// let aggregator = OccupancyAggregator::new(&store, Capacities::default(), TurnBounds::default());
/// let snapshot = aggregator
///     .snapshot(date, NaiveTime::from_hms_opt(10, 0, 0).unwrap())
///     .unwrap();
///
/// assert_eq!(snapshot.current_turn, Some(Turn::Morning));
/// assert!(snapshot.per_slot[&slot.id].morning_occupied);
/// assert_eq!(snapshot.by_vehicle[&VehicleType::Car].occupied_slots_now, 1);
/// ```
pub struct OccupancyAggregator<'a, S: DataStore + ?Sized> {
    store: &'a S,
    capacities: Capacities,
    default_bounds: TurnBounds,
}

impl<'a, S: DataStore + ?Sized> OccupancyAggregator<'a, S> {
    /// Creates an aggregator. `default_bounds` applies when the settings
    /// record is unavailable.
    pub const fn new(store: &'a S, capacities: Capacities, default_bounds: TurnBounds) -> Self {
        Self {
            store,
            capacities,
            default_bounds,
        }
    }

    /// Occupancy on `date` as seen at wall-clock time `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if slots or reservations cannot be read. Unreadable
    /// settings fall back to the default turn bounds.
    pub fn snapshot(&self, date: NaiveDate, now: NaiveTime) -> Result<OccupancySnapshot> {
        let current_turn = SettingsReader::new(self.store)
            .turn_bounds_or_default(self.default_bounds)
            .current_turn(now);

        let slots = SlotCatalog::new(self.store).list(&SlotFilter {
            active_only: true,
            ..SlotFilter::default()
        })?;
        let reservations = ReservationStore::new(self.store).active_on(date)?;

        let mut per_slot = BTreeMap::new();
        for slot in slots {
            let occupants: Vec<Occupant> = reservations
                .iter()
                .filter(|r| r.slot_id == slot.id)
                .map(|r| Occupant {
                    name: r.requester_name.clone(),
                    email: r.requester_email.clone(),
                    turn: r.turn,
                })
                .collect();

            let holding = |turn: Turn| occupants.iter().filter(|o| o.turn.occupies(turn)).count();
            let morning_count = holding(Turn::Morning);
            let afternoon_count = holding(Turn::Afternoon);

            let occupant_name = current_turn
                .and_then(|turn| occupants.iter().find(|o| o.turn.occupies(turn)))
                .or_else(|| occupants.first())
                .map(|o| o.name.clone());

            per_slot.insert(
                slot.id,
                SlotOccupancy {
                    capacity: self.capacities.for_vehicle(slot.vehicle_type) as usize,
                    code: slot.code,
                    vehicle_type: slot.vehicle_type,
                    assignment_mode: slot.assignment_mode,
                    morning_count,
                    afternoon_count,
                    morning_occupied: morning_count > 0,
                    afternoon_occupied: afternoon_count > 0,
                    occupant_name,
                    occupants,
                },
            );
        }

        let mut by_vehicle: BTreeMap<VehicleType, VehicleOccupancy> = VehicleType::ALL
            .iter()
            .map(|&vt| (vt, VehicleOccupancy::default()))
            .collect();
        for slot in per_slot.values() {
            let totals = by_vehicle.entry(slot.vehicle_type).or_default();
            totals.slots += 1;
            totals.capacity += slot.capacity;
            totals.used_now += slot.used_now(current_turn);
            if slot.occupied_now(current_turn) {
                totals.occupied_slots_now += 1;
            }
        }
        for totals in by_vehicle.values_mut() {
            totals.free_now = totals.capacity.saturating_sub(totals.used_now);
        }

        log::debug!(
            "occupancy for {date}: {} slot(s), current turn {current_turn:?}",
            per_slot.len()
        );
        Ok(OccupancySnapshot {
            date,
            current_turn,
            per_slot,
            by_vehicle,
        })
    }
}
