//! Reservation queries and writes over any [`ListStore`].

use chrono::NaiveDate;

use super::{
    normalize_email, NewReservation, Reservation, ReservationId, ReservationPatch,
    ReservationStatus, Turn,
};
use crate::error::{Error, Result};
use crate::slot::SlotId;
use crate::store::{Field, Filter, ListStore, Query};

/// Rows occupying `turn`.
///
/// A stored row occupies a half-day turn unless it is stored with the
/// opposite half, so legacy full-day markers count against both turns.
/// `FullDay` itself selects every turn.
fn occupying(turn: Turn) -> Option<Filter> {
    turn.other().map(|other| Filter::ne(Field::Turn, other))
}

fn with_turn(filter: Filter, turn: Turn) -> Filter {
    match occupying(turn) {
        Some(turn_filter) => filter.and(turn_filter),
        None => filter,
    }
}

fn active() -> Filter {
    Filter::eq(Field::Status, ReservationStatus::Active)
}

/// Active reservations on `slot_id` occupying `turn` of `date`.
#[must_use]
pub fn slot_date_turn_filter(slot_id: SlotId, date: NaiveDate, turn: Turn) -> Filter {
    with_turn(
        Filter::eq(Field::SlotId, slot_id)
            .and(Filter::eq(Field::Date, date))
            .and(active()),
        turn,
    )
}

/// Active reservations of `requester_email` occupying `turn` of `date`.
///
/// The e-mail is normalized before it is compared.
#[must_use]
pub fn requester_date_turn_filter(requester_email: &str, date: NaiveDate, turn: Turn) -> Filter {
    with_turn(
        Filter::eq(
            Field::RequesterEmail,
            requester_email.trim().to_lowercase(),
        )
        .and(Filter::eq(Field::Date, date))
        .and(active()),
        turn,
    )
}

/// Criteria for listing reservations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    /// Earliest date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest date, inclusive.
    pub to: Option<NaiveDate>,
    /// Only this slot.
    pub slot_id: Option<SlotId>,
    /// Only this requester (case-insensitive).
    pub requester_email: Option<String>,
    /// Only rows occupying this turn.
    pub turn: Option<Turn>,
    /// Include cancelled rows.
    pub include_cancelled: bool,
}

impl ReservationFilter {
    fn to_filter(&self) -> Option<Filter> {
        let mut parts = Vec::new();
        if let Some(from) = self.from {
            parts.push(Filter::gte(Field::Date, from));
        }
        if let Some(to) = self.to {
            parts.push(Filter::lte(Field::Date, to));
        }
        if let Some(slot_id) = self.slot_id {
            parts.push(Filter::eq(Field::SlotId, slot_id));
        }
        if let Some(email) = &self.requester_email {
            parts.push(Filter::eq(Field::RequesterEmail, email.trim().to_lowercase()));
        }
        if let Some(turn_filter) = self.turn.and_then(occupying) {
            parts.push(turn_filter);
        }
        if !self.include_cancelled {
            parts.push(active());
        }
        parts.into_iter().reduce(Filter::and)
    }
}

/// Reservation access for the engine and administrative tools.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use parkbook::reservation::store::ReservationStore;
/// use parkbook::store::MemoryStore;
/// use parkbook::{NewReservation, SlotId, Turn, VehicleType};
///
/// let store = MemoryStore::new();
/// let reservations = ReservationStore::new(&store);
/// let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let row = reservations
///     .create(
///         NewReservation::new(SlotId::new(1), date, Turn::Morning, VehicleType::Car, "a@x.com", "A")
///             .unwrap(),
///     )
///     .unwrap();
///
/// let cancelled = reservations.cancel(row.id).unwrap();
/// assert!(!cancelled.is_active());
/// // Cancelling twice is a no-op.
/// assert_eq!(reservations.cancel(row.id).unwrap(), cancelled);
/// ```
pub struct ReservationStore<'a, S: ListStore<Reservation> + ?Sized> {
    store: &'a S,
}

impl<'a, S: ListStore<Reservation> + ?Sized> ReservationStore<'a, S> {
    /// Wraps a store.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Writes an active row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row is malformed or the write fails.
    pub fn create(&self, fields: NewReservation) -> Result<Reservation> {
        if fields.turn == Turn::FullDay {
            return Err(Error::Validation {
                field: "turn".into(),
                message: "full-day bookings are written as one row per turn".into(),
            });
        }
        let fields = NewReservation {
            requester_email: normalize_email(&fields.requester_email)?,
            ..fields
        };
        self.store.create(fields)
    }

    /// Looks up a reservation by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn find(&self, id: ReservationId) -> Result<Option<Reservation>> {
        let rows = self
            .store
            .get_all(&Query::new().filter(Filter::eq(Field::Id, id)).top(1))?;
        Ok(rows.into_iter().next())
    }

    /// Looks up a reservation by id, failing when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or an error if the store cannot
    /// be queried.
    pub fn get(&self, id: ReservationId) -> Result<Reservation> {
        self.find(id)?.ok_or_else(|| Error::NotFound {
            resource: format!("reservation {id}"),
        })
    }

    /// Active rows on a slot occupying a turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn active_for_slot(
        &self,
        slot_id: SlotId,
        date: NaiveDate,
        turn: Turn,
    ) -> Result<Vec<Reservation>> {
        let filter = slot_date_turn_filter(slot_id, date, turn);
        log::debug!("querying reservations: {filter}");
        self.store.get_all(&Query::new().filter(filter))
    }

    /// Active rows of a requester occupying a turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn active_for_requester(
        &self,
        requester_email: &str,
        date: NaiveDate,
        turn: Turn,
    ) -> Result<Vec<Reservation>> {
        let filter = requester_date_turn_filter(requester_email, date, turn);
        log::debug!("querying reservations: {filter}");
        self.store.get_all(&Query::new().filter(filter))
    }

    /// Every active row on a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn active_on(&self, date: NaiveDate) -> Result<Vec<Reservation>> {
        self.store.get_all(
            &Query::new().filter(Filter::eq(Field::Date, date).and(active())),
        )
    }

    /// Rows matching `criteria`, by date, then turn, then id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn list(&self, criteria: &ReservationFilter) -> Result<Vec<Reservation>> {
        let mut query = Query::new()
            .order_by(Field::Date)
            .order_by_desc(Field::Turn)
            .order_by(Field::Id);
        query.filter = criteria.to_filter();
        self.store.get_all(&query)
    }

    /// Marks a reservation cancelled.
    ///
    /// Cancelling an already-cancelled row returns it unchanged without a
    /// write.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or an error if the store fails.
    pub fn cancel(&self, id: ReservationId) -> Result<Reservation> {
        let existing = self.get(id)?;
        if !existing.is_active() {
            log::debug!("reservation {id} already cancelled");
            return Ok(existing);
        }
        self.store
            .update(id, ReservationPatch::status(ReservationStatus::Cancelled))
    }

    /// Hard-deletes a reservation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or an error if the store fails.
    pub fn delete(&self, id: ReservationId) -> Result<()> {
        self.store.delete(id)
    }

    /// Hard-deletes every row referencing a slot, in any status.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails; rows deleted before the failure
    /// stay deleted.
    pub fn delete_for_slot(&self, slot_id: SlotId) -> Result<usize> {
        let rows = self
            .store
            .get_all(&Query::new().filter(Filter::eq(Field::SlotId, slot_id)))?;
        for row in &rows {
            self.store.delete(row.id)?;
        }
        Ok(rows.len())
    }
}
