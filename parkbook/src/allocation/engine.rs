//! The allocation engine.
//!
//! An allocation walks a fixed sequence of steps (see [`AllocationState`]):
//! the request is validated, the requester's own bookings are checked, the
//! eligible slots are listed in code order and each is tried until one has
//! room in every implied turn. Reads that fail abort the attempt. A write that
//! fails only disqualifies the slot being tried: rows already written for it
//! are deleted again and the next slot is tried.
//!
//! Conflict checks are reads, so two requests can both see the last free
//! place. With `verify_after_commit` the engine re-counts after writing and
//! withdraws its own rows if it overshot. The booking written first keeps
//! the place, so exactly the surplus withdraws.

use chrono::NaiveDate;

use super::request::{Allocation, AllocationPolicy, AllocationRequest, AllocationState};
use crate::error::{Error, Result};
use crate::reservation::conflict::ConflictChecker;
use crate::reservation::store::ReservationStore;
use crate::reservation::{normalize_email, NewReservation, Reservation, ReservationId, Turn};
use crate::settings::reader::SettingsReader;
use crate::slot::catalog::SlotCatalog;
use crate::slot::{AssignmentMode, Slot, SlotId};
use crate::store::DataStore;

/// Result of writing the rows for one candidate.
enum CommitOutcome {
    Committed(Vec<Reservation>),
    /// The write failed and every row written for the candidate was removed.
    Failed(Error),
}

/// Result of the post-write re-count.
enum Verdict {
    Confirmed,
    SlotOverrun(Turn),
    RequesterDuplicated(Turn),
}

/// Books slots for requests.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use parkbook::allocation::{AllocationEngine, AllocationPolicy, AllocationRequest};
/// use parkbook::store::MemoryStore;
/// use parkbook::slot::catalog::SlotCatalog;
/// use parkbook::{AssignmentMode, NewSlot, Turn, VehicleType};
///
/// let store = MemoryStore::new();
/// SlotCatalog::new(&store)
///     .add(NewSlot::new("A-01", VehicleType::Car, AssignmentMode::Itinerant).unwrap())
///     .unwrap();
///
/// let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let engine = AllocationEngine::new(&store, AllocationPolicy::default());
/// let request =
///     AllocationRequest::new(VehicleType::Car, Turn::Morning, today, "alice@x.com", "Alice").unwrap();
///
/// let allocation = engine.allocate(&request, today).unwrap();
/// assert_eq!(allocation.slot_code, "A-01");
/// assert_eq!(allocation.reservations.len(), 1);
/// ```
pub struct AllocationEngine<'a, S: DataStore + ?Sized> {
    store: &'a S,
    policy: AllocationPolicy,
}

impl<'a, S: DataStore + ?Sized> AllocationEngine<'a, S> {
    /// Creates an engine over `store`.
    pub const fn new(store: &'a S, policy: AllocationPolicy) -> Self {
        Self { store, policy }
    }

    /// The policy in effect.
    #[must_use]
    pub const fn policy(&self) -> &AllocationPolicy {
        &self.policy
    }

    fn catalog(&self) -> SlotCatalog<'a, S> {
        SlotCatalog::new(self.store)
    }

    fn reservations(&self) -> ReservationStore<'a, S> {
        ReservationStore::new(self.store)
    }

    fn checker(&self) -> ConflictChecker<'a, S> {
        ConflictChecker::new(self.store, self.policy.capacities)
    }

    fn trace(request: &AllocationRequest, state: AllocationState) {
        log::debug!("allocation [{request}]: {state}");
    }

    /// Books the first itinerant slot with room for every turn `request`
    /// implies.
    ///
    /// `today` anchors the booking window.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank requester e-mail
    /// - `OutsideBookingWindow` when the window is enforced and the date is
    ///   outside it
    /// - `AlreadyBooked` when the requester already holds an implied turn
    /// - `NoSlotsConfigured` when no active itinerant slot exists for the
    ///   vehicle type
    /// - `NoAvailability` when every candidate is full or failed to commit
    /// - `PartialCommit` when a failed write could not be undone
    /// - a store error when any read fails
    pub fn allocate(&self, request: &AllocationRequest, today: NaiveDate) -> Result<Allocation> {
        Self::trace(request, AllocationState::Validate);
        let request = self.validate(request, today)?;

        Self::trace(&request, AllocationState::RequesterCheck);
        self.check_requester(&request)?;

        Self::trace(&request, AllocationState::CatalogScan);
        let candidates = self
            .catalog()
            .list_eligible_slots(request.vehicle_type, AssignmentMode::Itinerant)?;
        if candidates.is_empty() {
            return Err(Error::NoSlotsConfigured {
                vehicle_type: request.vehicle_type,
            });
        }

        let checker = self.checker();
        for slot in &candidates {
            Self::trace(&request, AllocationState::CandidateEvaluation);
            if let Some(turn) = checker.full_turn(slot, request.date, request.turn)? {
                log::debug!("slot {} rejected: full for {turn}", slot.code);
                continue;
            }

            Self::trace(&request, AllocationState::Commit);
            let rows = match self.commit(slot, &request)? {
                CommitOutcome::Committed(rows) => rows,
                CommitOutcome::Failed(err) => {
                    log::warn!("booking slot {} failed, trying the next one: {err}", slot.code);
                    Self::trace(&request, AllocationState::Fallback);
                    continue;
                }
            };

            match self.verify(slot, &request, &rows)? {
                Verdict::Confirmed => return Ok(Self::confirm(slot, &request, rows)),
                Verdict::SlotOverrun(turn) => {
                    log::warn!(
                        "slot {} overbooked for {turn} by a concurrent request, trying the next one",
                        slot.code
                    );
                    Self::trace(&request, AllocationState::Fallback);
                }
                Verdict::RequesterDuplicated(turn) => {
                    return Err(Self::already_booked(&request, turn));
                }
            }
        }

        Err(Error::NoAvailability {
            vehicle_type: request.vehicle_type,
            date: request.date,
            turn: request.turn,
        })
    }

    /// Books a specific slot, whatever its assignment mode.
    ///
    /// The booking window is not enforced. Requester and capacity checks
    /// still apply.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the slot does not exist or is inactive
    /// - `Validation` if the slot is for another vehicle type
    /// - `AlreadyBooked` when the requester already holds an implied turn
    /// - `SlotUnavailable` when the slot is full for an implied turn
    /// - the store error if the write fails, or `PartialCommit` if it could
    ///   not be undone
    pub fn assign(&self, slot_id: SlotId, request: &AllocationRequest) -> Result<Allocation> {
        Self::trace(request, AllocationState::Validate);
        let request = AllocationRequest {
            requester_email: normalize_email(&request.requester_email)?,
            ..request.clone()
        };

        let slot = self.catalog().get(slot_id)?;
        if !slot.active {
            return Err(Error::NotFound {
                resource: format!("active slot {slot_id}"),
            });
        }
        if slot.vehicle_type != request.vehicle_type {
            return Err(Error::Validation {
                field: "vehicle_type".into(),
                message: format!(
                    "slot {} takes {}, not {}",
                    slot.code, slot.vehicle_type, request.vehicle_type
                ),
            });
        }

        Self::trace(&request, AllocationState::RequesterCheck);
        self.check_requester(&request)?;

        Self::trace(&request, AllocationState::CandidateEvaluation);
        if let Some(turn) = self.checker().full_turn(&slot, request.date, request.turn)? {
            return Err(Self::slot_unavailable(&slot, &request, turn));
        }

        Self::trace(&request, AllocationState::Commit);
        let rows = match self.commit(&slot, &request)? {
            CommitOutcome::Committed(rows) => rows,
            CommitOutcome::Failed(err) => return Err(err),
        };

        match self.verify(&slot, &request, &rows)? {
            Verdict::Confirmed => Ok(Self::confirm(&slot, &request, rows)),
            Verdict::SlotOverrun(turn) => Err(Self::slot_unavailable(&slot, &request, turn)),
            Verdict::RequesterDuplicated(turn) => Err(Self::already_booked(&request, turn)),
        }
    }

    /// Cancels a reservation. Cancelling twice returns the row unchanged.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or an error if the store fails.
    pub fn cancel(&self, id: ReservationId) -> Result<Reservation> {
        let cancelled = self.reservations().cancel(id)?;
        log::info!("cancelled reservation {id}");
        Ok(cancelled)
    }

    /// Cancels every active reservation the requester holds on `date`, in
    /// either turn. Returns the rows that were cancelled.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank e-mail, or an error if the
    /// store fails; rows cancelled before the failure stay cancelled.
    pub fn cancel_full_day(&self, requester_email: &str, date: NaiveDate) -> Result<Vec<Reservation>> {
        let email = normalize_email(requester_email)?;
        let reservations = self.reservations();

        let mut ids: Vec<ReservationId> = Vec::new();
        for &turn in Turn::FullDay.implied() {
            for row in reservations.active_for_requester(&email, date, turn)? {
                if !ids.contains(&row.id) {
                    ids.push(row.id);
                }
            }
        }

        let mut cancelled = Vec::with_capacity(ids.len());
        for id in ids {
            cancelled.push(reservations.cancel(id)?);
        }
        log::info!("cancelled {} reservation(s) of {email} on {date}", cancelled.len());
        Ok(cancelled)
    }

    fn validate(&self, request: &AllocationRequest, today: NaiveDate) -> Result<AllocationRequest> {
        let request = AllocationRequest {
            requester_email: normalize_email(&request.requester_email)?,
            ..request.clone()
        };

        if self.policy.enforce_booking_window {
            let window = SettingsReader::new(self.store)
                .booking_window_or_default(today, self.policy.default_visible_days);
            if !window.contains(request.date) {
                return Err(Error::OutsideBookingWindow {
                    date: request.date,
                    min_date: window.min_date,
                    max_date: window.max_date,
                });
            }
        }

        Ok(request)
    }

    fn check_requester(&self, request: &AllocationRequest) -> Result<()> {
        if let Some(turn) =
            self.checker()
                .booked_turn(&request.requester_email, request.date, request.turn)?
        {
            return Err(Self::already_booked(request, turn));
        }
        Ok(())
    }

    /// Writes one row per implied turn. A failed write removes the rows
    /// already written for this slot; `Err` means they could not be removed.
    fn commit(&self, slot: &Slot, request: &AllocationRequest) -> Result<CommitOutcome> {
        let reservations = self.reservations();
        let mut written: Vec<Reservation> = Vec::with_capacity(2);

        for &turn in request.turn.implied() {
            let attempt = NewReservation::new(
                slot.id,
                request.date,
                turn,
                slot.vehicle_type,
                &request.requester_email,
                &request.requester_name,
            )
            .map_err(Error::from)
            .and_then(|row| reservations.create(row));

            match attempt {
                Ok(row) => {
                    log::debug!("wrote reservation {} on slot {} for {turn}", row.id, slot.code);
                    written.push(row);
                }
                Err(err) => {
                    if !written.is_empty() {
                        Self::trace(request, AllocationState::Compensate);
                        self.compensate(&written, &err.to_string())?;
                    }
                    return Ok(CommitOutcome::Failed(err));
                }
            }
        }

        Ok(CommitOutcome::Committed(written))
    }

    /// Deletes rows this engine just wrote.
    fn compensate(&self, rows: &[Reservation], cause: &str) -> Result<()> {
        let reservations = self.reservations();
        let mut remaining: Vec<ReservationId> = rows.iter().map(|r| r.id).collect();
        let mut failure = None;

        remaining.retain(|&id| match reservations.delete(id) {
            Ok(()) => {
                log::debug!("withdrew reservation {id}");
                false
            }
            Err(err) => {
                log::error!("could not withdraw reservation {id}: {err}");
                failure.get_or_insert(err.to_string());
                true
            }
        });

        match failure {
            None => Ok(()),
            Some(details) => Err(Error::PartialCommit {
                reservations: remaining,
                details: format!("{cause}; cleanup failed: {details}"),
            }),
        }
    }

    /// Re-counts after a commit and withdraws the rows on overrun.
    fn verify(
        &self,
        slot: &Slot,
        request: &AllocationRequest,
        rows: &[Reservation],
    ) -> Result<Verdict> {
        if !self.policy.verify_after_commit {
            return Ok(Verdict::Confirmed);
        }
        Self::trace(request, AllocationState::Verify);

        let checker = self.checker();
        let verdict = checker
            .overrun_turn(slot, request.date, request.turn, rows)
            .and_then(|overrun| match overrun {
                Some(turn) => Ok(Verdict::SlotOverrun(turn)),
                None => checker
                    .duplicated_turn(&request.requester_email, request.date, request.turn, rows)
                    .map(|dup| dup.map_or(Verdict::Confirmed, Verdict::RequesterDuplicated)),
            });

        match verdict {
            Ok(Verdict::Confirmed) => Ok(Verdict::Confirmed),
            Ok(rejected) => {
                Self::trace(request, AllocationState::Compensate);
                self.compensate(rows, "concurrent booking detected")?;
                Ok(rejected)
            }
            Err(err) => {
                // The rows are written; an unreadable re-count does not undo them
                log::warn!("could not verify booking on slot {}: {err}", slot.code);
                Ok(Verdict::Confirmed)
            }
        }
    }

    fn confirm(slot: &Slot, request: &AllocationRequest, rows: Vec<Reservation>) -> Allocation {
        Self::trace(request, AllocationState::Done);
        log::info!("booked slot {} for {request}", slot.code);
        Allocation {
            message: format!(
                "Slot {} booked for your {} on {} ({}).",
                slot.code, request.vehicle_type, request.date, request.turn
            ),
            slot_code: slot.code.clone(),
            slot_id: slot.id,
            reservations: rows,
        }
    }

    fn already_booked(request: &AllocationRequest, turn: Turn) -> Error {
        Error::AlreadyBooked {
            requester: request.requester_email.clone(),
            vehicle_type: request.vehicle_type,
            date: request.date,
            turn,
        }
    }

    fn slot_unavailable(
        slot: &Slot,
        request: &AllocationRequest,
        turn: Turn,
    ) -> Error {
        Error::SlotUnavailable {
            code: slot.code.clone(),
            date: request.date,
            turn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservation::ReservationStatus;
    use crate::settings::{NewSettings, TurnBounds};
    use crate::slot::{NewSlot, VehicleType};
    use crate::store::{FailurePoint, ListStore, MemoryStore, Query};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn add_slot(store: &MemoryStore, code: &str, vt: VehicleType, mode: AssignmentMode) -> Slot {
        SlotCatalog::new(store)
            .add(NewSlot::new(code, vt, mode).unwrap())
            .unwrap()
    }

    fn request(vt: VehicleType, turn: Turn, email: &str) -> AllocationRequest {
        AllocationRequest::new(vt, turn, today(), email, email).unwrap()
    }

    fn active(store: &MemoryStore) -> Vec<Reservation> {
        store
            .reservations()
            .into_iter()
            .filter(Reservation::is_active)
            .collect()
    }

    #[test]
    fn test_allocate_first_slot_in_code_order() {
        let store = MemoryStore::new();
        add_slot(&store, "A-02", VehicleType::Car, AssignmentMode::Itinerant);
        add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let allocation = engine
            .allocate(&request(VehicleType::Car, Turn::Morning, "a@x.com"), today())
            .unwrap();
        assert_eq!(allocation.slot_code, "A-01");
        assert!(allocation.message.contains("A-01"));
        assert!(allocation.message.contains("2025-03-10"));
    }

    #[test]
    fn test_allocate_skips_non_itinerant_and_inactive() {
        let store = MemoryStore::new();
        add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::FixedAssignee);
        add_slot(&store, "A-02", VehicleType::Car, AssignmentMode::Executive);
        let inactive = add_slot(&store, "A-03", VehicleType::Car, AssignmentMode::Itinerant);
        SlotCatalog::new(&store).set_active(inactive.id, false).unwrap();
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let err = engine
            .allocate(&request(VehicleType::Car, Turn::Morning, "a@x.com"), today())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NoSlotsConfigured {
                vehicle_type: VehicleType::Car
            }
        ));
    }

    #[test]
    fn test_allocate_full_day_writes_two_rows() {
        let store = MemoryStore::new();
        add_slot(&store, "M-01", VehicleType::Motorcycle, AssignmentMode::Itinerant);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let allocation = engine
            .allocate(&request(VehicleType::Motorcycle, Turn::FullDay, "a@x.com"), today())
            .unwrap();
        let turns: Vec<Turn> = allocation.reservations.iter().map(|r| r.turn).collect();
        assert_eq!(turns, vec![Turn::Morning, Turn::Afternoon]);
        assert_eq!(active(&store).len(), 2);
    }

    #[test]
    fn test_full_day_needs_both_turns_free() {
        let store = MemoryStore::new();
        add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        add_slot(&store, "A-02", VehicleType::Car, AssignmentMode::Itinerant);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        engine
            .allocate(&request(VehicleType::Car, Turn::Afternoon, "b@x.com"), today())
            .unwrap();
        let allocation = engine
            .allocate(&request(VehicleType::Car, Turn::FullDay, "a@x.com"), today())
            .unwrap();
        assert_eq!(allocation.slot_code, "A-02");
    }

    #[test]
    fn test_requester_check_runs_before_catalog() {
        let store = MemoryStore::new();
        let slot = add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        ReservationStore::new(&store)
            .create(
                NewReservation::new(slot.id, today(), Turn::Morning, VehicleType::Car, "a@x.com", "A")
                    .unwrap(),
            )
            .unwrap();
        store.fail_at(FailurePoint::SlotReads);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let err = engine
            .allocate(&request(VehicleType::Motorcycle, Turn::FullDay, "A@X.com"), today())
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyBooked { turn: Turn::Morning, .. }));
    }

    #[test]
    fn test_catalog_read_failure_is_fatal() {
        let store = MemoryStore::new();
        add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        store.fail_at(FailurePoint::SlotReads);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let err = engine
            .allocate(&request(VehicleType::Car, Turn::Morning, "a@x.com"), today())
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(store.reservation_create_attempts(), 0);
    }

    #[test]
    fn test_commit_failure_falls_back_to_next_slot() {
        let store = MemoryStore::new();
        let first = add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        add_slot(&store, "A-02", VehicleType::Car, AssignmentMode::Itinerant);
        store.fail_at(FailurePoint::ReservationCreateForSlot(first.id));
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let allocation = engine
            .allocate(&request(VehicleType::Car, Turn::Morning, "a@x.com"), today())
            .unwrap();
        assert_eq!(allocation.slot_code, "A-02");
    }

    #[test]
    fn test_partial_full_day_is_compensated() {
        let store = MemoryStore::new();
        add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        store.fail_at(FailurePoint::NthReservationCreate(2));
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let err = engine
            .allocate(&request(VehicleType::Car, Turn::FullDay, "a@x.com"), today())
            .unwrap_err();
        assert!(matches!(err, Error::NoAvailability { .. }));
        assert!(store.reservations().is_empty());
    }

    #[test]
    fn test_failed_compensation_reports_partial_commit() {
        let store = MemoryStore::new();
        add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        store.fail_at(FailurePoint::NthReservationCreate(2));
        store.fail_at(FailurePoint::ReservationDeletes);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let err = engine
            .allocate(&request(VehicleType::Car, Turn::FullDay, "a@x.com"), today())
            .unwrap_err();
        let orphan = store.reservations()[0].id;
        match err {
            Error::PartialCommit { reservations, .. } => assert_eq!(reservations, vec![orphan]),
            other => panic!("expected PartialCommit, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_withdraws_overrun_and_falls_back() {
        let store = MemoryStore::new();
        let first = add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        add_slot(&store, "A-02", VehicleType::Car, AssignmentMode::Itinerant);
        store.inject_rival(
            NewReservation::new(first.id, today(), Turn::Morning, VehicleType::Car, "r@x.com", "R")
                .unwrap(),
        );
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let allocation = engine
            .allocate(&request(VehicleType::Car, Turn::Morning, "a@x.com"), today())
            .unwrap();
        assert_eq!(allocation.slot_code, "A-02");

        let on_first: Vec<_> = active(&store)
            .into_iter()
            .filter(|r| r.slot_id == first.id)
            .collect();
        assert_eq!(on_first.len(), 1);
        assert_eq!(on_first[0].requester_email, "r@x.com");
    }

    #[test]
    fn test_without_verify_overrun_is_kept() {
        let store = MemoryStore::new();
        let first = add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        store.inject_rival(
            NewReservation::new(first.id, today(), Turn::Morning, VehicleType::Car, "r@x.com", "R")
                .unwrap(),
        );
        let policy = AllocationPolicy {
            verify_after_commit: false,
            ..AllocationPolicy::default()
        };
        let engine = AllocationEngine::new(&store, policy);

        engine
            .allocate(&request(VehicleType::Car, Turn::Morning, "a@x.com"), today())
            .unwrap();
        assert_eq!(active(&store).len(), 2);
    }

    #[test]
    fn test_verify_detects_requester_race() {
        let store = MemoryStore::new();
        let first = add_slot(&store, "M-01", VehicleType::Motorcycle, AssignmentMode::Itinerant);
        store.inject_rival(
            NewReservation::new(
                first.id,
                today(),
                Turn::Morning,
                VehicleType::Motorcycle,
                "a@x.com",
                "A",
            )
            .unwrap(),
        );
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let err = engine
            .allocate(&request(VehicleType::Motorcycle, Turn::Morning, "a@x.com"), today())
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyBooked { .. }));
        assert_eq!(active(&store).len(), 1);
    }

    #[test]
    fn test_booking_window_enforced() {
        let store = MemoryStore::new();
        add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        SettingsReader::new(&store)
            .save(NewSettings {
                visible_days: 2,
                turn_bounds: TurnBounds::default(),
            })
            .unwrap();
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let mut late = request(VehicleType::Car, Turn::Morning, "a@x.com");
        late.date = today() + chrono::Days::new(3);
        let err = engine.allocate(&late, today()).unwrap_err();
        assert!(matches!(err, Error::OutsideBookingWindow { .. }));

        let mut past = request(VehicleType::Car, Turn::Morning, "a@x.com");
        past.date = today().pred_opt().unwrap();
        assert!(engine.allocate(&past, today()).is_err());

        let mut edge = request(VehicleType::Car, Turn::Morning, "a@x.com");
        edge.date = today() + chrono::Days::new(2);
        engine.allocate(&edge, today()).unwrap();
    }

    #[test]
    fn test_booking_window_falls_back_when_settings_unreadable() {
        let store = MemoryStore::new();
        add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        store.fail_at(FailurePoint::SettingsReads);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        engine
            .allocate(&request(VehicleType::Car, Turn::Morning, "a@x.com"), today())
            .unwrap();
    }

    #[test]
    fn test_corrupt_window_setting_falls_back_to_default() {
        let store = MemoryStore::new();
        add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        ListStore::<crate::settings::Settings>::create(
            &store,
            NewSettings {
                visible_days: u32::MAX,
                turn_bounds: TurnBounds::default(),
            },
        )
        .unwrap();
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let allocation = engine
            .allocate(&request(VehicleType::Car, Turn::Morning, "a@x.com"), today())
            .unwrap();
        assert_eq!(allocation.slot_code, "A-01");

        let mut late = request(VehicleType::Car, Turn::Morning, "b@x.com");
        late.date = today() + chrono::Days::new(400);
        assert!(matches!(
            engine.allocate(&late, today()),
            Err(Error::OutsideBookingWindow { .. })
        ));
    }

    #[test]
    fn test_blank_email_rejected() {
        let store = MemoryStore::new();
        add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let mut bad = request(VehicleType::Car, Turn::Morning, "a@x.com");
        bad.requester_email = "   ".into();
        assert!(matches!(
            engine.allocate(&bad, today()),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_assign_ignores_assignment_mode() {
        let store = MemoryStore::new();
        let fixed = add_slot(&store, "E-01", VehicleType::Car, AssignmentMode::Executive);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let allocation = engine
            .assign(fixed.id, &request(VehicleType::Car, Turn::FullDay, "boss@x.com"))
            .unwrap();
        assert_eq!(allocation.slot_code, "E-01");
        assert_eq!(allocation.reservations.len(), 2);

        let err = engine
            .assign(fixed.id, &request(VehicleType::Car, Turn::Morning, "other@x.com"))
            .unwrap_err();
        assert!(matches!(err, Error::SlotUnavailable { turn: Turn::Morning, .. }));
    }

    #[test]
    fn test_assign_rejects_inactive_and_mismatched_slots() {
        let store = MemoryStore::new();
        let slot = add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let err = engine
            .assign(slot.id, &request(VehicleType::Motorcycle, Turn::Morning, "a@x.com"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        SlotCatalog::new(&store).set_active(slot.id, false).unwrap();
        let err = engine
            .assign(slot.id, &request(VehicleType::Car, Turn::Morning, "a@x.com"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let err = engine
            .assign(SlotId::new(999), &request(VehicleType::Car, Turn::Morning, "a@x.com"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_assign_surfaces_commit_error() {
        let store = MemoryStore::new();
        let slot = add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        store.fail_at(FailurePoint::ReservationCreateForSlot(slot.id));
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let err = engine
            .assign(slot.id, &request(VehicleType::Car, Turn::Morning, "a@x.com"))
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let store = MemoryStore::new();
        add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());
        let allocation = engine
            .allocate(&request(VehicleType::Car, Turn::Morning, "a@x.com"), today())
            .unwrap();
        let id = allocation.reservations[0].id;

        let first = engine.cancel(id).unwrap();
        let second = engine.cancel(id).unwrap();
        assert_eq!(first.status, ReservationStatus::Cancelled);
        assert_eq!(first, second);
        assert!(matches!(
            engine.cancel(ReservationId::new(999)),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_cancelled_place_can_be_rebooked() {
        let store = MemoryStore::new();
        add_slot(&store, "A-01", VehicleType::Car, AssignmentMode::Itinerant);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());
        let allocation = engine
            .allocate(&request(VehicleType::Car, Turn::Morning, "a@x.com"), today())
            .unwrap();
        engine.cancel(allocation.reservations[0].id).unwrap();

        engine
            .allocate(&request(VehicleType::Car, Turn::Morning, "b@x.com"), today())
            .unwrap();
    }

    #[test]
    fn test_cancel_full_day() {
        let store = MemoryStore::new();
        add_slot(&store, "M-01", VehicleType::Motorcycle, AssignmentMode::Itinerant);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());
        engine
            .allocate(&request(VehicleType::Motorcycle, Turn::FullDay, "a@x.com"), today())
            .unwrap();

        let cancelled = engine.cancel_full_day("A@x.com", today()).unwrap();
        assert_eq!(cancelled.len(), 2);
        assert!(active(&store).is_empty());
        assert!(engine.cancel_full_day("a@x.com", today()).unwrap().is_empty());
    }

    #[test]
    fn test_capacity_from_policy() {
        let store = MemoryStore::new();
        add_slot(&store, "M-01", VehicleType::Motorcycle, AssignmentMode::Itinerant);
        let mut policy = AllocationPolicy::default();
        policy.capacities.motorcycle = 2;
        let engine = AllocationEngine::new(&store, policy);

        for email in ["a@x.com", "b@x.com"] {
            engine
                .allocate(&request(VehicleType::Motorcycle, Turn::Morning, email), today())
                .unwrap();
        }
        let err = engine
            .allocate(&request(VehicleType::Motorcycle, Turn::Morning, "c@x.com"), today())
            .unwrap_err();
        assert!(matches!(err, Error::NoAvailability { .. }));
        let rows: Vec<Reservation> = store.get_all(&Query::new()).unwrap();
        assert_eq!(rows.len(), 2);
    }
}
