//! Conflict checks run before a reservation is written.
//!
//! Two rules keep the data consistent: a requester holds at most one active
//! reservation per date and turn, and a slot never holds more active
//! reservations per date and turn than its vehicle type allows. Both checks
//! are reads; nothing here locks.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::store::ReservationStore;
use super::{Reservation, ReservationId, Turn};
use crate::error::Result;
use crate::slot::{Capacities, Slot, SlotId};
use crate::store::ListStore;

/// Read-only conflict rules over a reservation store.
pub struct ConflictChecker<'a, S: ListStore<Reservation> + ?Sized> {
    reservations: ReservationStore<'a, S>,
    capacities: Capacities,
}

impl<'a, S: ListStore<Reservation> + ?Sized> ConflictChecker<'a, S> {
    /// Creates a checker using `capacities` as slot ceilings.
    pub const fn new(store: &'a S, capacities: Capacities) -> Self {
        Self {
            reservations: ReservationStore::new(store),
            capacities,
        }
    }

    /// Returns true if the requester already holds an active reservation
    /// occupying any turn implied by `turn`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn has_active_reservation(
        &self,
        requester_email: &str,
        date: NaiveDate,
        turn: Turn,
    ) -> Result<bool> {
        Ok(self.booked_turn(requester_email, date, turn)?.is_some())
    }

    /// The first implied turn the requester already holds, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn booked_turn(
        &self,
        requester_email: &str,
        date: NaiveDate,
        turn: Turn,
    ) -> Result<Option<Turn>> {
        for &implied in turn.implied() {
            let rows = self
                .reservations
                .active_for_requester(requester_email, date, implied)?;
            if !rows.is_empty() {
                return Ok(Some(implied));
            }
        }
        Ok(None)
    }

    /// Number of active reservations on a slot occupying `turn`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn count_active(&self, slot_id: SlotId, date: NaiveDate, turn: Turn) -> Result<usize> {
        Ok(self.reservations.active_for_slot(slot_id, date, turn)?.len())
    }

    /// Capacity of a slot.
    #[must_use]
    pub const fn capacity(&self, slot: &Slot) -> usize {
        self.capacities.for_vehicle(slot.vehicle_type) as usize
    }

    /// The first implied turn in which the slot is full, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn full_turn(&self, slot: &Slot, date: NaiveDate, turn: Turn) -> Result<Option<Turn>> {
        let capacity = self.capacity(slot);
        for &implied in turn.implied() {
            let count = self.count_active(slot.id, date, implied)?;
            if count >= capacity {
                log::debug!(
                    "slot {} full on {date} {implied}: {count}/{capacity}",
                    slot.code
                );
                return Ok(Some(implied));
            }
        }
        Ok(None)
    }

    /// Returns true if every implied turn of the slot has room left.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn has_capacity(&self, slot: &Slot, date: NaiveDate, turn: Turn) -> Result<bool> {
        Ok(self.full_turn(slot, date, turn)?.is_none())
    }

    /// Active rows on either half of `date` held through `rows_for`, each
    /// listed once.
    fn whole_day(
        rows_for: impl Fn(Turn) -> Result<Vec<Reservation>>,
    ) -> Result<Vec<Reservation>> {
        let mut day: Vec<Reservation> = Vec::new();
        for &half in Turn::FullDay.implied() {
            for row in rows_for(half)? {
                if !day.iter().any(|seen| seen.id == row.id) {
                    day.push(row);
                }
            }
        }
        Ok(day)
    }

    /// Returns true if some row of `own` occupying `turn` is not among the
    /// first `keep` rows of `day` occupying `turn`.
    ///
    /// Rows are ranked by the earliest row id of the booking they belong to
    /// (rows sharing `booking`'s key), then by their own id. Every writer
    /// ranks the same way, so only the surplus withdraws and the two halves
    /// of a full day agree.
    fn outranked<K: Eq + std::hash::Hash>(
        day: &[Reservation],
        own: &[Reservation],
        turn: Turn,
        keep: usize,
        booking: impl Fn(&Reservation) -> K,
    ) -> bool {
        let mut earliest: HashMap<K, ReservationId> = HashMap::new();
        for row in day {
            earliest
                .entry(booking(row))
                .and_modify(|id| *id = (*id).min(row.id))
                .or_insert(row.id);
        }

        let mut holders: Vec<(ReservationId, ReservationId)> = day
            .iter()
            .filter(|row| row.turn.occupies(turn))
            .map(|row| {
                let first = earliest.get(&booking(row)).copied().unwrap_or(row.id);
                (first, row.id)
            })
            .collect();
        if holders.len() <= keep {
            return false;
        }
        holders.sort_unstable();
        let kept: Vec<ReservationId> = holders.iter().take(keep).map(|&(_, id)| id).collect();

        own.iter()
            .any(|mine| mine.turn.occupies(turn) && !kept.contains(&mine.id))
    }

    /// The first implied turn in which one of `own` falls outside the slot's
    /// capacity, if any.
    ///
    /// When concurrent writers overfill a slot, the bookings written first
    /// keep their places.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn overrun_turn(
        &self,
        slot: &Slot,
        date: NaiveDate,
        turn: Turn,
        own: &[Reservation],
    ) -> Result<Option<Turn>> {
        let day = Self::whole_day(|half| self.reservations.active_for_slot(slot.id, date, half))?;
        let capacity = self.capacity(slot);
        Ok(turn.implied().iter().copied().find(|&implied| {
            Self::outranked(&day, own, implied, capacity, |row| {
                row.requester_email.clone()
            })
        }))
    }

    /// The first implied turn in which the requester holds an earlier
    /// booking than `own`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn duplicated_turn(
        &self,
        requester_email: &str,
        date: NaiveDate,
        turn: Turn,
        own: &[Reservation],
    ) -> Result<Option<Turn>> {
        let day = Self::whole_day(|half| {
            self.reservations
                .active_for_requester(requester_email, date, half)
        })?;
        Ok(turn
            .implied()
            .iter()
            .copied()
            .find(|&implied| Self::outranked(&day, own, implied, 1, |row| row.slot_id)))
    }
}
