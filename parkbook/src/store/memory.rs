//! In-process store.
//!
//! [`MemoryStore`] keeps every entity in a `Vec` behind a `RefCell` and
//! evaluates queries with [`Query::apply`]. It also lets tests script
//! failures at precise points and simulate a rival writer that slips in
//! between the conflict check and the write.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use chrono::Utc;

use crate::error::{Error, Result};
use crate::reservation::{NewReservation, Reservation, ReservationId, ReservationPatch};
use crate::settings::{NewSettings, Settings, SettingsPatch};
use crate::slot::{NewSlot, Slot, SlotId, SlotPatch};

use super::{not_found, ListStore, Query};

/// Where a scripted failure fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    /// Every slot query fails.
    SlotReads,
    /// Every reservation query fails.
    ReservationReads,
    /// Every settings query fails.
    SettingsReads,
    /// The nth reservation create from now fails (1-based).
    NthReservationCreate(usize),
    /// Every reservation create targeting this slot fails.
    ReservationCreateForSlot(SlotId),
    /// Every reservation delete fails.
    ReservationDeletes,
}

#[derive(Debug, Default)]
struct Tables {
    slots: Vec<Slot>,
    reservations: Vec<Reservation>,
    settings: Vec<Settings>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of every [`ListStore`] the engine needs.
///
/// # Examples
///
/// ```
/// use parkbook::store::{ListStore, MemoryStore, Query};
/// use parkbook::{AssignmentMode, NewSlot, Slot, VehicleType};
///
/// let store = MemoryStore::new();
/// let slot: Slot = store
///     .create(NewSlot::new("A-01", VehicleType::Car, AssignmentMode::Itinerant).unwrap())
///     .unwrap();
/// let all: Vec<Slot> = store.get_all(&Query::new()).unwrap();
/// assert_eq!(all, vec![slot]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<Tables>,
    failures: RefCell<HashSet<FailurePoint>>,
    reservation_creates: Cell<usize>,
    rivals: RefCell<Vec<NewReservation>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a failure.
    ///
    /// `NthReservationCreate` counts from the moment it is scripted.
    pub fn fail_at(&self, point: FailurePoint) {
        let point = match point {
            FailurePoint::NthReservationCreate(n) => {
                FailurePoint::NthReservationCreate(self.reservation_creates.get() + n)
            }
            other => other,
        };
        self.failures.borrow_mut().insert(point);
    }

    /// Removes every scripted failure.
    pub fn clear_failures(&self) {
        self.failures.borrow_mut().clear();
    }

    /// Queues a reservation that is written just before the next reservation
    /// create, as if a concurrent request had won the race.
    pub fn inject_rival(&self, rival: NewReservation) {
        self.rivals.borrow_mut().push(rival);
    }

    /// Number of reservation creates attempted so far, including failed ones.
    #[must_use]
    pub fn reservation_create_attempts(&self) -> usize {
        self.reservation_creates.get()
    }

    /// Snapshot of every stored reservation, in insertion order.
    #[must_use]
    pub fn reservations(&self) -> Vec<Reservation> {
        self.tables.borrow().reservations.clone()
    }

    fn failing(&self, point: &FailurePoint) -> bool {
        self.failures.borrow().contains(point)
    }

    fn failure(operation: &str) -> Error {
        Error::StoreFailure {
            operation: operation.to_string(),
            details: "scripted failure".to_string(),
        }
    }

    fn insert_reservation(tables: &mut Tables, fields: NewReservation) -> Reservation {
        let id = ReservationId::new(tables.next_id());
        let reservation = fields.into_reservation(id, Utc::now());
        tables.reservations.push(reservation.clone());
        reservation
    }
}

impl ListStore<Slot> for MemoryStore {
    fn get_all(&self, query: &Query) -> Result<Vec<Slot>> {
        if self.failing(&FailurePoint::SlotReads) {
            return Err(Self::failure("query slots"));
        }
        Ok(query.apply(&self.tables.borrow().slots))
    }

    fn create(&self, fields: NewSlot) -> Result<Slot> {
        let mut tables = self.tables.borrow_mut();
        if tables.slots.iter().any(|s| s.code == fields.code) {
            return Err(Error::Validation {
                field: "code".into(),
                message: format!("slot code '{}' already exists", fields.code),
            });
        }
        let slot = Slot {
            id: SlotId::new(tables.next_id()),
            code: fields.code,
            vehicle_type: fields.vehicle_type,
            active: fields.active,
            assignment_mode: fields.assignment_mode,
        };
        tables.slots.push(slot.clone());
        Ok(slot)
    }

    fn update(&self, id: SlotId, patch: SlotPatch) -> Result<Slot> {
        let mut tables = self.tables.borrow_mut();
        if let Some(code) = &patch.code {
            if tables.slots.iter().any(|s| &s.code == code && s.id != id) {
                return Err(Error::Validation {
                    field: "code".into(),
                    message: format!("slot code '{code}' already exists"),
                });
            }
        }
        let slot = tables
            .slots
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found::<Slot>(id))?;
        patch.apply(slot);
        Ok(slot.clone())
    }

    fn delete(&self, id: SlotId) -> Result<()> {
        let mut tables = self.tables.borrow_mut();
        let before = tables.slots.len();
        tables.slots.retain(|s| s.id != id);
        if tables.slots.len() == before {
            return Err(not_found::<Slot>(id));
        }
        Ok(())
    }
}

impl ListStore<Reservation> for MemoryStore {
    fn get_all(&self, query: &Query) -> Result<Vec<Reservation>> {
        if self.failing(&FailurePoint::ReservationReads) {
            return Err(Self::failure("query reservations"));
        }
        Ok(query.apply(&self.tables.borrow().reservations))
    }

    fn create(&self, fields: NewReservation) -> Result<Reservation> {
        let attempt = self.reservation_creates.get() + 1;
        self.reservation_creates.set(attempt);

        let mut tables = self.tables.borrow_mut();
        for rival in self.rivals.borrow_mut().drain(..) {
            Self::insert_reservation(&mut tables, rival);
        }

        if self.failing(&FailurePoint::NthReservationCreate(attempt))
            || self.failing(&FailurePoint::ReservationCreateForSlot(fields.slot_id))
        {
            return Err(Self::failure("create reservation"));
        }
        Ok(Self::insert_reservation(&mut tables, fields))
    }

    fn update(&self, id: ReservationId, patch: ReservationPatch) -> Result<Reservation> {
        let mut tables = self.tables.borrow_mut();
        let reservation = tables
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found::<Reservation>(id))?;
        patch.apply(reservation);
        Ok(reservation.clone())
    }

    fn delete(&self, id: ReservationId) -> Result<()> {
        if self.failing(&FailurePoint::ReservationDeletes) {
            return Err(Self::failure("delete reservation"));
        }
        let mut tables = self.tables.borrow_mut();
        let before = tables.reservations.len();
        tables.reservations.retain(|r| r.id != id);
        if tables.reservations.len() == before {
            return Err(not_found::<Reservation>(id));
        }
        Ok(())
    }
}

impl ListStore<Settings> for MemoryStore {
    fn get_all(&self, query: &Query) -> Result<Vec<Settings>> {
        if self.failing(&FailurePoint::SettingsReads) {
            return Err(Self::failure("query settings"));
        }
        Ok(query.apply(&self.tables.borrow().settings))
    }

    fn create(&self, fields: NewSettings) -> Result<Settings> {
        let mut tables = self.tables.borrow_mut();
        let settings = Settings {
            id: tables.next_id(),
            visible_days: fields.visible_days,
            turn_bounds: fields.turn_bounds,
        };
        tables.settings.push(settings.clone());
        Ok(settings)
    }

    fn update(&self, id: i64, patch: SettingsPatch) -> Result<Settings> {
        let mut tables = self.tables.borrow_mut();
        let settings = tables
            .settings
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found::<Settings>(id))?;
        patch.apply(settings);
        Ok(settings.clone())
    }

    fn delete(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.borrow_mut();
        let before = tables.settings.len();
        tables.settings.retain(|s| s.id != id);
        if tables.settings.len() == before {
            return Err(not_found::<Settings>(id));
        }
        Ok(())
    }
}
