//! Error types for the parkbook library.
//!
//! This module provides the error hierarchy for every operation in the
//! library, using `thiserror` for ergonomic error handling. The refusal
//! variants (`AlreadyBooked`, `NoSlotsConfigured`, `NoAvailability`, ...)
//! carry enough context to render a message that names the vehicle type,
//! date and turn of the request that was refused.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::reservation::{ReservationId, Turn};
use crate::slot::VehicleType;

/// Result type alias for operations that may fail with a parkbook error.
///
/// # Examples
///
/// ```
/// use parkbook::{Error, Result};
///
/// fn example_operation() -> Result<u32> {
///     Ok(4)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the parkbook library.
#[derive(Debug, Error)]
pub enum Error {
    /// The settings record could not be read or does not exist.
    ///
    /// Callers may fall back to default values; allocation still proceeds.
    #[error("settings unavailable: {reason}")]
    ConfigUnavailable {
        /// Why the settings could not be used.
        reason: String,
    },

    /// The requester already holds an active reservation for one of the
    /// turns implied by the request.
    #[error("{requester} already has a {vehicle_type} reservation on {date} ({turn})")]
    AlreadyBooked {
        /// The requester's e-mail.
        requester: String,
        /// Vehicle type of the refused request.
        vehicle_type: VehicleType,
        /// Requested date.
        date: NaiveDate,
        /// The turn that is already booked.
        turn: Turn,
    },

    /// No active slot exists for the vehicle type and assignment mode.
    #[error("no {vehicle_type} slots are configured for on-demand booking")]
    NoSlotsConfigured {
        /// Vehicle type of the refused request.
        vehicle_type: VehicleType,
    },

    /// Every candidate slot lacked capacity for at least one implied turn.
    #[error("no {vehicle_type} slot available on {date} ({turn})")]
    NoAvailability {
        /// Vehicle type of the refused request.
        vehicle_type: VehicleType,
        /// Requested date.
        date: NaiveDate,
        /// Requested turn.
        turn: Turn,
    },

    /// A specific slot has no remaining capacity for the request.
    #[error("slot {code} is full on {date} ({turn})")]
    SlotUnavailable {
        /// Code of the slot that was requested.
        code: String,
        /// Requested date.
        date: NaiveDate,
        /// The turn without capacity.
        turn: Turn,
    },

    /// The requested date lies outside the visible booking window.
    #[error("{date} is outside the booking window ({min_date} to {max_date})")]
    OutsideBookingWindow {
        /// Requested date.
        date: NaiveDate,
        /// First bookable date.
        min_date: NaiveDate,
        /// Last bookable date.
        max_date: NaiveDate,
    },

    /// A multi-row commit failed halfway and the rows already written could
    /// not be removed.
    #[error("partial booking left behind reservation(s) {}: {details}", format_ids(.reservations))]
    PartialCommit {
        /// The reservations that remain persisted.
        reservations: Vec<ReservationId>,
        /// Description of the failure.
        details: String,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A data store reported a failure that is not a database error.
    #[error("store failure during {operation}: {details}")]
    StoreFailure {
        /// The store operation that failed.
        operation: String,
        /// Details about the failure.
        details: String,
    },

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// The requested record was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// A database lock timeout occurred.
    #[error("database lock timeout after {seconds}s")]
    LockTimeout {
        /// The number of seconds waited before timing out.
        seconds: u64,
    },

    /// The data directory was not found and auto-initialization is disabled.
    #[error("data directory not found: {}", path.display())]
    DataDirectoryNotFound {
        /// The expected path to the data directory.
        path: PathBuf,
    },

    /// An unsupported schema version was encountered.
    #[error("unsupported schema version: expected {expected}, found {found}")]
    UnsupportedSchemaVersion {
        /// The expected schema version.
        expected: i32,
        /// The schema version found in the database.
        found: i32,
    },
}

fn format_ids(ids: &[ReservationId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Returns true if the error came from the data-access layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use parkbook::Error;
    ///
    /// let err = Error::StoreFailure {
    ///     operation: "create reservation".into(),
    ///     details: "connection reset".into(),
    /// };
    /// assert!(err.is_transport());
    /// ```
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::StoreFailure { .. } | Self::LockTimeout { .. }
        )
    }

    /// Returns true if the error is a booking refusal meant for the end user
    /// rather than a fault.
    #[must_use]
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            Self::AlreadyBooked { .. }
                | Self::NoSlotsConfigured { .. }
                | Self::NoAvailability { .. }
                | Self::SlotUnavailable { .. }
                | Self::OutsideBookingWindow { .. }
        )
    }

    /// Message suitable for showing to the person who made the request.
    ///
    /// Refusals render their structured message. Transport failures are
    /// collapsed into a generic sentence; the raw text is only used when no
    /// structured message exists.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AlreadyBooked {
                vehicle_type,
                date,
                turn,
                ..
            } => format!("You already have a {vehicle_type} booking on {date} for the {turn} turn."),
            Self::NoSlotsConfigured { vehicle_type } => {
                format!("There are no {vehicle_type} slots available for booking. Contact an administrator.")
            }
            Self::NoAvailability {
                vehicle_type,
                date,
                turn,
            } => format!("No {vehicle_type} slot is free on {date} for the {turn} turn."),
            Self::Database(_) | Self::StoreFailure { .. } | Self::LockTimeout { .. } => {
                "The booking service is temporarily unavailable. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<crate::slot::ValidationError> for Error {
    fn from(err: crate::slot::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}
