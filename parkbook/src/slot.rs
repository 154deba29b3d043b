//! Parking slot types.
//!
//! A slot is a physical parking space typed by vehicle category and by how
//! it is handed out: on-demand (itinerant) or pre-assigned to a person.

pub mod catalog;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::store::{Entity, Field, Record, Value};

/// Error returned when a value fails domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the failure.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Identifier of a slot record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(i64);

impl SlotId {
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

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SlotId> for Value {
    fn from(id: SlotId) -> Self {
        Self::Int(id.0)
    }
}

/// Vehicle category a slot is built for.
///
/// # Examples
///
/// ```
/// use parkbook::VehicleType;
///
/// assert_eq!("moto".parse::<VehicleType>().unwrap(), VehicleType::Motorcycle);
/// assert_eq!(VehicleType::Car.default_capacity(), 1);
/// assert_eq!(VehicleType::Motorcycle.default_capacity(), 4);
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
pub enum VehicleType {
    /// Four-wheeled vehicle; one per slot and turn.
    Car,
    /// Motorcycle; several share one slot.
    #[value(alias = "moto")]
    Motorcycle,
}

impl VehicleType {
    /// All vehicle types, in display order.
    pub const ALL: [Self; 2] = [Self::Car, Self::Motorcycle];

    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Motorcycle => "Motorcycle",
        }
    }

    /// Number of simultaneous active reservations a slot of this type holds
    /// when no configuration overrides it.
    #[must_use]
    pub const fn default_capacity(self) -> u32 {
        match self {
            Self::Car => 1,
            Self::Motorcycle => 4,
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "car" => Ok(Self::Car),
            "motorcycle" | "moto" => Ok(Self::Motorcycle),
            other => Err(ValidationError::new(
                "vehicle_type",
                format!("unknown vehicle type '{other}'"),
            )),
        }
    }
}

impl From<VehicleType> for Value {
    fn from(vt: VehicleType) -> Self {
        Self::Text(vt.as_str().to_string())
    }
}

/// How a slot is handed out.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum AssignmentMode {
    /// Pre-assigned to one person.
    #[value(name = "fixed")]
    FixedAssignee,
    /// Bookable on demand, day by day.
    Itinerant,
    /// Reserved for executives; pre-assigned.
    Executive,
}

impl AssignmentMode {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FixedAssignee => "FixedAssignee",
            Self::Itinerant => "Itinerant",
            Self::Executive => "Executive",
        }
    }
}

impl fmt::Display for AssignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixedassignee" | "fixed" => Ok(Self::FixedAssignee),
            "itinerant" => Ok(Self::Itinerant),
            "executive" => Ok(Self::Executive),
            other => Err(ValidationError::new(
                "assignment_mode",
                format!("unknown assignment mode '{other}'"),
            )),
        }
    }
}

impl From<AssignmentMode> for Value {
    fn from(mode: AssignmentMode) -> Self {
        Self::Text(mode.as_str().to_string())
    }
}

/// Per-vehicle-type capacity ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacities {
    /// Capacity of a car slot.
    pub car: u32,
    /// Capacity of a motorcycle slot.
    pub motorcycle: u32,
}

impl Capacities {
    /// Capacity of a slot built for `vehicle_type`.
    #[must_use]
    pub const fn for_vehicle(&self, vehicle_type: VehicleType) -> u32 {
        match vehicle_type {
            VehicleType::Car => self.car,
            VehicleType::Motorcycle => self.motorcycle,
        }
    }
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            car: VehicleType::Car.default_capacity(),
            motorcycle: VehicleType::Motorcycle.default_capacity(),
        }
    }
}

/// A parking slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Store identifier.
    pub id: SlotId,
    /// Display code, unique across slots (e.g. "A-01").
    pub code: String,
    /// Vehicle category.
    pub vehicle_type: VehicleType,
    /// Inactive slots are never offered or counted.
    pub active: bool,
    /// How the slot is handed out.
    pub assignment_mode: AssignmentMode,
}

impl Slot {
    /// Returns true if the slot takes part in on-demand allocation.
    #[must_use]
    pub fn is_bookable(&self) -> bool {
        self.active && self.assignment_mode == AssignmentMode::Itinerant
    }
}

impl Record for Slot {
    fn field(&self, field: Field) -> Option<Value> {
        match field {
            Field::Id => Some(self.id.into()),
            Field::Code => Some(Value::Text(self.code.clone())),
            Field::VehicleType => Some(self.vehicle_type.into()),
            Field::Active => Some(Value::Bool(self.active)),
            Field::AssignmentMode => Some(self.assignment_mode.into()),
            _ => None,
        }
    }
}

impl Entity for Slot {
    type Id = SlotId;
    type Fields = NewSlot;
    type Patch = SlotPatch;

    const NAME: &'static str = "slot";

    fn id(&self) -> SlotId {
        self.id
    }
}

/// Fields of a slot that is about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlot {
    /// Display code.
    pub code: String,
    /// Vehicle category.
    pub vehicle_type: VehicleType,
    /// Whether the slot is active on creation.
    pub active: bool,
    /// How the slot is handed out.
    pub assignment_mode: AssignmentMode,
}

impl NewSlot {
    /// Creates an active slot definition, validating the code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is empty after trimming whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use parkbook::{AssignmentMode, NewSlot, VehicleType};
    ///
    /// let slot = NewSlot::new(" A-01 ", VehicleType::Car, AssignmentMode::Itinerant).unwrap();
    /// assert_eq!(slot.code, "A-01");
    /// assert!(NewSlot::new("  ", VehicleType::Car, AssignmentMode::Itinerant).is_err());
    /// ```
    pub fn new(
        code: impl AsRef<str>,
        vehicle_type: VehicleType,
        assignment_mode: AssignmentMode,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            code: validate_code(code.as_ref())?,
            vehicle_type,
            active: true,
            assignment_mode,
        })
    }
}

/// Partial update of a slot. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotPatch {
    /// New display code.
    pub code: Option<String>,
    /// New vehicle category.
    pub vehicle_type: Option<VehicleType>,
    /// New active flag.
    pub active: Option<bool>,
    /// New assignment mode.
    pub assignment_mode: Option<AssignmentMode>,
}

impl SlotPatch {
    /// Patch that only flips the active flag.
    #[must_use]
    pub fn active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Self::default()
        }
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.vehicle_type.is_none()
            && self.active.is_none()
            && self.assignment_mode.is_none()
    }

    /// Applies the patch to a slot in place.
    pub fn apply(&self, slot: &mut Slot) {
        if let Some(code) = &self.code {
            slot.code.clone_from(code);
        }
        if let Some(vehicle_type) = self.vehicle_type {
            slot.vehicle_type = vehicle_type;
        }
        if let Some(active) = self.active {
            slot.active = active;
        }
        if let Some(mode) = self.assignment_mode {
            slot.assignment_mode = mode;
        }
    }
}

pub(crate) fn validate_code(code: &str) -> Result<String, ValidationError> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(
            "code",
            "slot code must be non-empty after trimming whitespace",
        ));
    }
    Ok(trimmed.to_string())
}
