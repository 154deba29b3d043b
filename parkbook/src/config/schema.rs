//! Configuration schema definitions.
//!
//! Every field is optional so that partial files and environment overrides
//! can be layered; accessors such as [`Config::capacities`] fill in the
//! built-in defaults.

use serde::{Deserialize, Serialize};

use crate::settings::TurnBounds;
use crate::slot::{Capacities, VehicleType};

/// Booking window length used when the settings record is unavailable.
pub const DEFAULT_VISIBLE_DAYS: u32 = 14;

/// Complete configuration structure.
///
/// # Examples
///
/// ```
/// use parkbook::config::{CapacityConfig, Config};
///
/// let config = Config {
///     capacity: Some(CapacityConfig { car: None, motorcycle: Some(6) }),
///     ..Default::default()
/// };
/// assert_eq!(config.capacities().car, 1);
/// assert_eq!(config.capacities().motorcycle, 6);
/// assert!(config.verify_after_commit());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Booking window length when settings are unavailable.
    pub default_visible_days: Option<u32>,

    /// Turn boundaries when settings are unavailable.
    pub default_turn_bounds: Option<TurnBounds>,

    /// Per-vehicle slot capacity overrides.
    pub capacity: Option<CapacityConfig>,

    /// Re-count after each write and undo overruns.
    pub verify_after_commit: Option<bool>,

    /// Refuse bookings outside the booking window.
    pub enforce_booking_window: Option<bool>,

    /// Disable automatic database initialization.
    pub disable_autoinit: Option<bool>,

    /// Maximum time to wait for database lock acquisition (seconds).
    pub maximum_lock_wait_seconds: Option<u64>,

    /// Output format for list commands.
    pub output_format: Option<OutputFormat>,
}

impl Config {
    /// Effective slot capacities.
    #[must_use]
    pub fn capacities(&self) -> Capacities {
        let defaults = Capacities::default();
        self.capacity.as_ref().map_or(defaults, |c| Capacities {
            car: c.car.unwrap_or(defaults.car),
            motorcycle: c.motorcycle.unwrap_or(defaults.motorcycle),
        })
    }

    /// Effective fallback booking window length.
    #[must_use]
    pub fn visible_days(&self) -> u32 {
        self.default_visible_days.unwrap_or(DEFAULT_VISIBLE_DAYS)
    }

    /// Effective fallback turn boundaries.
    #[must_use]
    pub fn turn_bounds(&self) -> TurnBounds {
        self.default_turn_bounds.unwrap_or_default()
    }

    /// Whether writes are verified; on unless disabled.
    #[must_use]
    pub fn verify_after_commit(&self) -> bool {
        self.verify_after_commit.unwrap_or(true)
    }

    /// Whether the booking window is enforced; on unless disabled.
    #[must_use]
    pub fn enforce_booking_window(&self) -> bool {
        self.enforce_booking_window.unwrap_or(true)
    }
}

/// Per-vehicle capacity overrides.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CapacityConfig {
    /// Capacity of a car slot.
    pub car: Option<u32>,
    /// Capacity of a motorcycle slot.
    pub motorcycle: Option<u32>,
}

impl CapacityConfig {
    /// The override for one vehicle type, if set.
    #[must_use]
    pub const fn get(&self, vehicle_type: VehicleType) -> Option<u32> {
        match vehicle_type {
            VehicleType::Car => self.car,
            VehicleType::Motorcycle => self.motorcycle,
        }
    }
}

/// Output format for list-style commands.
///
/// # Examples
///
/// ```
/// use parkbook::config::OutputFormat;
///
/// let format = OutputFormat::Json;
/// assert_eq!(format.to_string(), "json");
/// ```
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output format.
    Json,
    /// CSV output format.
    Csv,
    /// TSV output format.
    Tsv,
    /// Human-readable table format.
    #[default]
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Tsv => write!(f, "tsv"),
            Self::Table => write!(f, "table"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_accessors() {
        let config = Config::default();
        assert_eq!(config.visible_days(), DEFAULT_VISIBLE_DAYS);
        assert_eq!(config.turn_bounds(), TurnBounds::default());
        assert_eq!(config.capacities(), Capacities::default());
        assert!(config.verify_after_commit());
        assert!(config.enforce_booking_window());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r"
default_visible_days: 30
default_turn_bounds:
  morning_start: 8
  morning_end: 13
  afternoon_start: 14
  afternoon_end: 19
capacity:
  motorcycle: 6
verify_after_commit: false
enforce_booking_window: false
maximum_lock_wait_seconds: 10
output_format: json
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.visible_days(), 30);
        assert_eq!(config.turn_bounds().morning_start, 8);
        assert_eq!(config.capacities().motorcycle, 6);
        assert_eq!(config.capacities().car, 1);
        assert!(!config.verify_after_commit());
        assert!(!config.enforce_booking_window());
        assert_eq!(config.output_format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_config_deny_unknown_fields() {
        let yaml = r"
default_visible_days: 7
ports: 5000
";
        let result: Result<Config, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_serde() {
        let format: OutputFormat = serde_yaml::from_str("tsv").unwrap();
        assert_eq!(format, OutputFormat::Tsv);
        assert!(serde_yaml::to_string(&format).unwrap().contains("tsv"));
    }

    #[test]
    fn test_capacity_config_get() {
        let caps = CapacityConfig {
            car: Some(2),
            motorcycle: None,
        };
        assert_eq!(caps.get(VehicleType::Car), Some(2));
        assert_eq!(caps.get(VehicleType::Motorcycle), None);
    }
}
