//! Reservation types.
//!
//! A reservation binds one requester to one slot for one turn of one date.
//! Only `Morning` and `Afternoon` rows are ever written; a `FullDay`
//! request expands into one row per turn.

pub mod conflict;
pub mod store;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::slot::{SlotId, ValidationError, VehicleType};
use crate::store::{Entity, Field, Record, Value};

/// Identifier of a reservation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(i64);

impl ReservationId {
    /// Wraps a raw store identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ReservationId> for Value {
    fn from(id: ReservationId) -> Self {
        Self::Int(id.0)
    }
}

/// A half of the working day, or both.
///
/// # Examples
///
/// ```
/// use parkbook::Turn;
///
/// assert_eq!(Turn::FullDay.implied(), &[Turn::Morning, Turn::Afternoon]);
/// assert_eq!(Turn::Morning.implied(), &[Turn::Morning]);
/// assert_eq!(Turn::from_stored("Dia"), Turn::FullDay);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum Turn {
    /// Morning turn.
    Morning,
    /// Afternoon turn.
    Afternoon,
    /// Both turns of the day.
    #[value(alias = "fullday", alias = "full")]
    FullDay,
}

impl Turn {
    const MORNING: [Self; 1] = [Self::Morning];
    const AFTERNOON: [Self; 1] = [Self::Afternoon];
    const BOTH: [Self; 2] = [Self::Morning, Self::Afternoon];

    /// The persisted turns this turn stands for.
    #[must_use]
    pub const fn implied(self) -> &'static [Self] {
        match self {
            Self::Morning => &Self::MORNING,
            Self::Afternoon => &Self::AFTERNOON,
            Self::FullDay => &Self::BOTH,
        }
    }

    /// Returns true if a row stored with this turn occupies `turn`.
    ///
    /// A full-day row occupies both halves.
    #[must_use]
    pub fn occupies(self, turn: Self) -> bool {
        self == turn || self == Self::FullDay || turn == Self::FullDay
    }

    /// The opposite half of the day. `FullDay` has none.
    #[must_use]
    pub const fn other(self) -> Option<Self> {
        match self {
            Self::Morning => Some(Self::Afternoon),
            Self::Afternoon => Some(Self::Morning),
            Self::FullDay => None,
        }
    }

    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::FullDay => "FullDay",
        }
    }

    /// Interprets a stored turn value.
    ///
    /// Anything other than morning or afternoon is read as a full-day
    /// marker, which covers rows written by older tools.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "morning" => Self::Morning,
            "afternoon" => Self::Afternoon,
            _ => Self::FullDay,
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Turn {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "fullday" | "full-day" | "full" => Ok(Self::FullDay),
            other => Err(ValidationError::new("turn", format!("unknown turn '{other}'"))),
        }
    }
}

impl From<Turn> for Value {
    fn from(turn: Turn) -> Self {
        Self::Text(turn.as_str().to_string())
    }
}

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Counts against capacity.
    Active,
    /// Kept for history; never counted.
    Cancelled,
}

impl ReservationStatus {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(ValidationError::new(
                "status",
                format!("unknown reservation status '{other}'"),
            )),
        }
    }
}

impl From<ReservationStatus> for Value {
    fn from(status: ReservationStatus) -> Self {
        Self::Text(status.as_str().to_string())
    }
}

/// A reservation row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Store identifier.
    pub id: ReservationId,
    /// The slot held.
    pub slot_id: SlotId,
    /// The day held.
    pub date: NaiveDate,
    /// The turn held. `FullDay` only appears for legacy rows.
    pub turn: Turn,
    /// Vehicle type of the request.
    pub vehicle_type: VehicleType,
    /// Requester e-mail, lower-cased.
    pub requester_email: String,
    /// Requester display name.
    pub requester_name: String,
    /// Lifecycle state.
    pub status: ReservationStatus,
    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Returns true if the reservation counts against capacity.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }
}

impl Record for Reservation {
    fn field(&self, field: Field) -> Option<Value> {
        match field {
            Field::Id => Some(self.id.into()),
            Field::SlotId => Some(self.slot_id.into()),
            Field::Date => Some(self.date.into()),
            Field::Turn => Some(self.turn.into()),
            Field::VehicleType => Some(self.vehicle_type.into()),
            Field::RequesterEmail => Some(Value::Text(self.requester_email.clone())),
            Field::RequesterName => Some(Value::Text(self.requester_name.clone())),
            Field::Status => Some(self.status.into()),
            Field::CreatedAt => Some(Value::Int(self.created_at.timestamp())),
            _ => None,
        }
    }
}

impl Entity for Reservation {
    type Id = ReservationId;
    type Fields = NewReservation;
    type Patch = ReservationPatch;

    const NAME: &'static str = "reservation";

    fn id(&self) -> ReservationId {
        self.id
    }
}

/// Fields of a reservation row that is about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    /// The slot to hold.
    pub slot_id: SlotId,
    /// The day to hold.
    pub date: NaiveDate,
    /// A persisted turn (`Morning` or `Afternoon`).
    pub turn: Turn,
    /// Vehicle type of the request.
    pub vehicle_type: VehicleType,
    /// Requester e-mail.
    pub requester_email: String,
    /// Requester display name.
    pub requester_name: String,
}

impl NewReservation {
    /// Builds a row, normalizing the requester e-mail.
    ///
    /// # Errors
    ///
    /// Returns an error if `turn` is `FullDay` or the e-mail is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use parkbook::{NewReservation, SlotId, Turn, VehicleType};
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    /// let row = NewReservation::new(
    ///     SlotId::new(1), date, Turn::Morning, VehicleType::Car, " Alice@X.com ", "Alice",
    /// )
    /// .unwrap();
    /// assert_eq!(row.requester_email, "alice@x.com");
    ///
    /// assert!(NewReservation::new(
    ///     SlotId::new(1), date, Turn::FullDay, VehicleType::Car, "a@x.com", "A",
    /// )
    /// .is_err());
    /// ```
    pub fn new(
        slot_id: SlotId,
        date: NaiveDate,
        turn: Turn,
        vehicle_type: VehicleType,
        requester_email: &str,
        requester_name: &str,
    ) -> Result<Self, ValidationError> {
        if turn == Turn::FullDay {
            return Err(ValidationError::new(
                "turn",
                "full-day bookings are written as one row per turn",
            ));
        }
        Ok(Self {
            slot_id,
            date,
            turn,
            vehicle_type,
            requester_email: normalize_email(requester_email)?,
            requester_name: requester_name.trim().to_string(),
        })
    }

    pub(crate) fn into_reservation(self, id: ReservationId, created_at: DateTime<Utc>) -> Reservation {
        Reservation {
            id,
            slot_id: self.slot_id,
            date: self.date,
            turn: self.turn,
            vehicle_type: self.vehicle_type,
            requester_email: self.requester_email,
            requester_name: self.requester_name,
            status: ReservationStatus::Active,
            created_at,
        }
    }
}

/// Partial update of a reservation. Only the status may change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationPatch {
    /// New status.
    pub status: Option<ReservationStatus>,
}

impl ReservationPatch {
    /// Patch that sets the status.
    #[must_use]
    pub const fn status(status: ReservationStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    /// Applies the patch in place.
    pub fn apply(&self, reservation: &mut Reservation) {
        if let Some(status) = self.status {
            reservation.status = status;
        }
    }
}

/// Trims and lower-cases an e-mail address.
///
/// # Errors
///
/// Returns an error if the address is blank.
pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(
            "requester_email",
            "requester e-mail must be non-empty",
        ));
    }
    Ok(trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_turn_parse_and_display() {
        assert_eq!("morning".parse::<Turn>().unwrap(), Turn::Morning);
        assert_eq!("AFTERNOON".parse::<Turn>().unwrap(), Turn::Afternoon);
        assert_eq!("full-day".parse::<Turn>().unwrap(), Turn::FullDay);
        assert!("evening".parse::<Turn>().is_err());
        assert_eq!(Turn::FullDay.to_string(), "FullDay");
    }

    #[test]
    fn test_turn_from_stored_treats_unknown_as_full_day() {
        assert_eq!(Turn::from_stored("Morning"), Turn::Morning);
        assert_eq!(Turn::from_stored("afternoon"), Turn::Afternoon);
        assert_eq!(Turn::from_stored("Dia"), Turn::FullDay);
        assert_eq!(Turn::from_stored(""), Turn::FullDay);
    }

    #[test]
    fn test_turn_occupies() {
        assert!(Turn::Morning.occupies(Turn::Morning));
        assert!(!Turn::Morning.occupies(Turn::Afternoon));
        assert!(Turn::FullDay.occupies(Turn::Afternoon));
        assert!(Turn::Afternoon.occupies(Turn::FullDay));
    }

    #[test]
    fn test_turn_other() {
        assert_eq!(Turn::Morning.other(), Some(Turn::Afternoon));
        assert_eq!(Turn::Afternoon.other(), Some(Turn::Morning));
        assert_eq!(Turn::FullDay.other(), None);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "canceled".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Cancelled
        );
        assert!("pending".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_new_reservation_rejects_blank_email() {
        let err = NewReservation::new(
            SlotId::new(1),
            date(),
            Turn::Morning,
            VehicleType::Car,
            "   ",
            "Nobody",
        )
        .unwrap_err();
        assert_eq!(err.field, "requester_email");
    }

    #[test]
    fn test_into_reservation_is_active() {
        let row = NewReservation::new(
            SlotId::new(3),
            date(),
            Turn::Afternoon,
            VehicleType::Motorcycle,
            "Bob@X.com",
            " Bob ",
        )
        .unwrap();
        let r = row.into_reservation(ReservationId::new(9), Utc::now());
        assert!(r.is_active());
        assert_eq!(r.requester_email, "bob@x.com");
        assert_eq!(r.requester_name, "Bob");
        assert_eq!(r.field(Field::Turn), Some(Value::Text("Afternoon".into())));
        assert_eq!(r.field(Field::Date), Some(Value::Date(date())));
    }

    #[test]
    fn test_patch_apply() {
        let mut r = NewReservation::new(
            SlotId::new(1),
            date(),
            Turn::Morning,
            VehicleType::Car,
            "a@x.com",
            "A",
        )
        .unwrap()
        .into_reservation(ReservationId::new(1), Utc::now());
        ReservationPatch::default().apply(&mut r);
        assert!(r.is_active());
        ReservationPatch::status(ReservationStatus::Cancelled).apply(&mut r);
        assert_eq!(r.status, ReservationStatus::Cancelled);
    }
}
