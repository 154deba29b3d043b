//! Allocation inputs, outputs and policy.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{Config, DEFAULT_VISIBLE_DAYS};
use crate::error::Result;
use crate::reservation::{normalize_email, Reservation, Turn};
use crate::slot::{Capacities, SlotId, VehicleType};

/// A request for a slot.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use parkbook::allocation::AllocationRequest;
/// use parkbook::{Turn, VehicleType};
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let request = AllocationRequest::new(VehicleType::Car, Turn::FullDay, date, "Alice@X.com", "Alice")
///     .unwrap();
/// assert_eq!(request.requester_email, "alice@x.com");
/// assert!(AllocationRequest::new(VehicleType::Car, Turn::Morning, date, "  ", "Nobody").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Vehicle to park.
    pub vehicle_type: VehicleType,
    /// Requested turn; `FullDay` books both halves.
    pub turn: Turn,
    /// Requested day.
    pub date: NaiveDate,
    /// Requester e-mail, lower-cased.
    pub requester_email: String,
    /// Requester display name.
    pub requester_name: String,
}

impl AllocationRequest {
    /// Builds a request, normalizing the requester e-mail.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the e-mail is blank.
    pub fn new(
        vehicle_type: VehicleType,
        turn: Turn,
        date: NaiveDate,
        requester_email: &str,
        requester_name: &str,
    ) -> Result<Self> {
        Ok(Self {
            vehicle_type,
            turn,
            date,
            requester_email: normalize_email(requester_email)?,
            requester_name: requester_name.trim().to_string(),
        })
    }
}

impl fmt::Display for AllocationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} on {} for {}",
            self.vehicle_type, self.turn, self.date, self.requester_email
        )
    }
}

/// A successful booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    /// Confirmation for the requester.
    pub message: String,
    /// Code of the slot that was booked.
    pub slot_code: String,
    /// Id of the slot that was booked.
    pub slot_id: SlotId,
    /// The rows written, one per implied turn.
    pub reservations: Vec<Reservation>,
}

/// Engine switches and limits.
///
/// # Examples
///
/// ```
/// use parkbook::allocation::AllocationPolicy;
/// use parkbook::config::Config;
///
/// let policy = AllocationPolicy::from_config(&Config {
///     verify_after_commit: Some(false),
///     ..Default::default()
/// });
/// assert!(!policy.verify_after_commit);
/// assert!(policy.enforce_booking_window);
/// assert_eq!(policy.capacities.motorcycle, 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationPolicy {
    /// Slot capacities by vehicle type.
    pub capacities: Capacities,
    /// Re-count after each commit and undo overruns.
    pub verify_after_commit: bool,
    /// Refuse dates outside the booking window.
    pub enforce_booking_window: bool,
    /// Window length used when the settings record is unavailable.
    pub default_visible_days: u32,
}

impl AllocationPolicy {
    /// Policy derived from the effective configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            capacities: config.capacities(),
            verify_after_commit: config.verify_after_commit(),
            enforce_booking_window: config.enforce_booking_window(),
            default_visible_days: config.visible_days(),
        }
    }
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            capacities: Capacities::default(),
            verify_after_commit: true,
            enforce_booking_window: true,
            default_visible_days: DEFAULT_VISIBLE_DAYS,
        }
    }
}

/// Steps of one allocation attempt, as traced in the debug log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationState {
    /// Checking the request itself.
    Validate,
    /// Looking for the requester's own bookings.
    RequesterCheck,
    /// Listing eligible slots.
    CatalogScan,
    /// Checking one slot's capacity.
    CandidateEvaluation,
    /// Writing the rows.
    Commit,
    /// Removing rows written for a rejected candidate.
    Compensate,
    /// Moving on to the next candidate.
    Fallback,
    /// Re-counting after the write.
    Verify,
    /// Finished.
    Done,
}

impl fmt::Display for AllocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validate => "validate",
            Self::RequesterCheck => "requester-check",
            Self::CatalogScan => "catalog-scan",
            Self::CandidateEvaluation => "candidate-evaluation",
            Self::Commit => "commit",
            Self::Compensate => "compensate",
            Self::Fallback => "fallback",
            Self::Verify => "verify",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}
