//! Configuration validation.

use crate::config::schema::{CapacityConfig, Config};
use crate::error::{Error, Result};
use crate::settings::MAX_VISIBLE_DAYS;

/// Largest capacity accepted for a single slot.
pub const MAX_SLOT_CAPACITY: u32 = 64;

/// Validates configuration values.
///
/// # Examples
///
/// ```
/// use parkbook::config::{Config, ConfigValidator};
///
/// let config = Config::default();
/// ConfigValidator::validate(&config).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first invalid field.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(days) = config.default_visible_days {
            if days == 0 || days > MAX_VISIBLE_DAYS {
                return Err(Error::Validation {
                    field: "default_visible_days".into(),
                    message: format!("Must be between 1 and {MAX_VISIBLE_DAYS}"),
                });
            }
        }

        if let Some(bounds) = config.default_turn_bounds {
            bounds.validate().map_err(|err| Error::Validation {
                field: format!("default_turn_bounds.{}", err.field),
                message: err.message,
            })?;
        }

        if let Some(capacity) = config.capacity {
            Self::validate_capacity(&capacity)?;
        }

        if let Some(timeout) = config.maximum_lock_wait_seconds {
            if timeout == 0 {
                return Err(Error::Validation {
                    field: "maximum_lock_wait_seconds".into(),
                    message: "Timeout must be greater than 0".into(),
                });
            }
        }

        Ok(())
    }

    fn validate_capacity(capacity: &CapacityConfig) -> Result<()> {
        for (field, value) in [
            ("capacity.car", capacity.car),
            ("capacity.motorcycle", capacity.motorcycle),
        ] {
            if let Some(value) = value {
                if value == 0 || value > MAX_SLOT_CAPACITY {
                    return Err(Error::Validation {
                        field: field.into(),
                        message: format!("Must be between 1 and {MAX_SLOT_CAPACITY}"),
                    });
                }
            }
        }
        Ok(())
    }
}
