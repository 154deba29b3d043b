//! Environment variable handling for configuration overrides.
//!
//! `PARKBOOK_*` variables override values read from the configuration file.

use crate::config::schema::{Config, OutputFormat};
use crate::error::{Error, Result};
use crate::settings::TurnBounds;
use std::env;
use std::str::FromStr;

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use parkbook::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable value is invalid
    /// (e.g., non-numeric day count, invalid boolean).
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(days) = env::var("PARKBOOK_DEFAULT_VISIBLE_DAYS") {
            config.default_visible_days =
                Some(Self::parse_number("PARKBOOK_DEFAULT_VISIBLE_DAYS", &days)?);
        }

        if let Ok(bounds) = env::var("PARKBOOK_DEFAULT_TURN_BOUNDS") {
            config.default_turn_bounds = Some(Self::parse_turn_bounds(&bounds)?);
        }

        Self::apply_capacity_overrides(config)?;

        if let Ok(val) = env::var("PARKBOOK_VERIFY_AFTER_COMMIT") {
            config.verify_after_commit =
                Some(Self::parse_bool("PARKBOOK_VERIFY_AFTER_COMMIT", &val)?);
        }

        if let Ok(val) = env::var("PARKBOOK_ENFORCE_BOOKING_WINDOW") {
            config.enforce_booking_window =
                Some(Self::parse_bool("PARKBOOK_ENFORCE_BOOKING_WINDOW", &val)?);
        }

        if let Ok(val) = env::var("PARKBOOK_DISABLE_AUTOINIT") {
            config.disable_autoinit = Some(Self::parse_bool("PARKBOOK_DISABLE_AUTOINIT", &val)?);
        }

        if let Ok(seconds) = env::var("PARKBOOK_MAXIMUM_LOCK_WAIT_SECONDS") {
            config.maximum_lock_wait_seconds = Some(Self::parse_number(
                "PARKBOOK_MAXIMUM_LOCK_WAIT_SECONDS",
                &seconds,
            )?);
        }

        if let Ok(format) = env::var("PARKBOOK_OUTPUT_FORMAT") {
            config.output_format = Some(Self::parse_output_format(&format)?);
        }

        Ok(())
    }

    fn apply_capacity_overrides(config: &mut Config) -> Result<()> {
        let mut capacity = config.capacity.unwrap_or_default();
        let mut modified = false;

        if let Ok(car) = env::var("PARKBOOK_CAPACITY_CAR") {
            capacity.car = Some(Self::parse_number("PARKBOOK_CAPACITY_CAR", &car)?);
            modified = true;
        }

        if let Ok(motorcycle) = env::var("PARKBOOK_CAPACITY_MOTORCYCLE") {
            capacity.motorcycle = Some(Self::parse_number(
                "PARKBOOK_CAPACITY_MOTORCYCLE",
                &motorcycle,
            )?);
            modified = true;
        }

        if modified {
            config.capacity = Some(capacity);
        }

        Ok(())
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }

    fn parse_number<T: FromStr>(field: &str, s: &str) -> Result<T> {
        s.trim().parse().map_err(|_| Error::Validation {
            field: field.into(),
            message: format!("Must be a non-negative integer, got '{s}'"),
        })
    }

    fn parse_output_format(s: &str) -> Result<OutputFormat> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "table" => Ok(OutputFormat::Table),
            _ => Err(Error::Validation {
                field: "PARKBOOK_OUTPUT_FORMAT".into(),
                message: format!("Unknown output format '{s}' (expected json/csv/tsv/table)"),
            }),
        }
    }

    /// Parse turn boundaries written as `"7-12,13-18"`.
    fn parse_turn_bounds(s: &str) -> Result<TurnBounds> {
        s.parse().map_err(|err: crate::slot::ValidationError| Error::Validation {
            field: "PARKBOOK_DEFAULT_TURN_BOUNDS".into(),
            message: err.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PARKBOOK_DEFAULT_VISIBLE_DAYS",
        "PARKBOOK_DEFAULT_TURN_BOUNDS",
        "PARKBOOK_CAPACITY_CAR",
        "PARKBOOK_CAPACITY_MOTORCYCLE",
        "PARKBOOK_VERIFY_AFTER_COMMIT",
        "PARKBOOK_ENFORCE_BOOKING_WINDOW",
        "PARKBOOK_DISABLE_AUTOINIT",
        "PARKBOOK_MAXIMUM_LOCK_WAIT_SECONDS",
        "PARKBOOK_OUTPUT_FORMAT",
    ];

    fn clear_vars() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_parse_bool_true_variants() {
        for s in ["true", "TRUE", "1", "yes", "On"] {
            assert!(EnvironmentConfig::parse_bool("X", s).unwrap(), "{s}");
        }
    }

    #[test]
    fn test_parse_bool_false_variants() {
        for s in ["false", "False", "0", "no", "OFF"] {
            assert!(!EnvironmentConfig::parse_bool("X", s).unwrap(), "{s}");
        }
    }

    #[test]
    fn test_parse_bool_invalid() {
        assert!(EnvironmentConfig::parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_parse_turn_bounds() {
        let bounds = EnvironmentConfig::parse_turn_bounds("8-12, 13-19").unwrap();
        assert_eq!(bounds.morning_start, 8);
        assert_eq!(bounds.morning_end, 12);
        assert_eq!(bounds.afternoon_start, 13);
        assert_eq!(bounds.afternoon_end, 19);
    }

    #[test]
    fn test_parse_turn_bounds_invalid() {
        assert!(EnvironmentConfig::parse_turn_bounds("8-12").is_err());
        assert!(EnvironmentConfig::parse_turn_bounds("8-x,13-19").is_err());
        assert!(EnvironmentConfig::parse_turn_bounds("").is_err());
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(
            EnvironmentConfig::parse_output_format("JSON").unwrap(),
            OutputFormat::Json
        );
        assert!(EnvironmentConfig::parse_output_format("xml").is_err());
    }

    #[test]
    #[serial]
    fn test_apply_overrides_no_env_vars() {
        clear_vars();
        let mut config = Config::default();
        EnvironmentConfig::apply_overrides(&mut config).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_apply_overrides_sets_values() {
        clear_vars();
        env::set_var("PARKBOOK_DEFAULT_VISIBLE_DAYS", "21");
        env::set_var("PARKBOOK_CAPACITY_MOTORCYCLE", "6");
        env::set_var("PARKBOOK_VERIFY_AFTER_COMMIT", "off");

        let mut config = Config::default();
        let result = EnvironmentConfig::apply_overrides(&mut config);
        clear_vars();
        result.unwrap();

        assert_eq!(config.default_visible_days, Some(21));
        assert_eq!(config.capacities().motorcycle, 6);
        assert_eq!(config.capacities().car, 1);
        assert_eq!(config.verify_after_commit, Some(false));
    }

    #[test]
    #[serial]
    fn test_apply_overrides_rejects_bad_number() {
        clear_vars();
        env::set_var("PARKBOOK_CAPACITY_CAR", "-1");
        let mut config = Config::default();
        let result = EnvironmentConfig::apply_overrides(&mut config);
        clear_vars();
        assert!(matches!(result, Err(Error::Validation { field, .. }) if field == "PARKBOOK_CAPACITY_CAR"));
    }
}
