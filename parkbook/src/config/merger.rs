//! Precedence-ordered layering of configuration sources.

use crate::config::loader::ConfigSource;
use crate::config::schema::{CapacityConfig, Config};

/// Layers configuration sources into one [`Config`].
///
/// A layer only changes the keys it sets. Capacity is layered per vehicle
/// type; turn bounds are replaced whole because the four hours are only
/// meaningful together.
///
/// ```
/// use parkbook::config::{Config, ConfigMerger};
///
/// let mut config = Config { default_visible_days: Some(7), ..Default::default() };
/// ConfigMerger::merge_into(&mut config, &Config { default_visible_days: Some(30), ..Default::default() });
/// assert_eq!(config.default_visible_days, Some(30));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Folds `sources` lowest precedence first, whatever order they arrive in.
    #[must_use]
    pub fn merge(mut sources: Vec<ConfigSource>) -> Config {
        sources.sort_by_key(|source| source.precedence);
        sources.iter().fold(Config::default(), |mut merged, source| {
            Self::merge_into(&mut merged, &source.config);
            merged
        })
    }

    /// Lays `layer` over `target`.
    pub fn merge_into(target: &mut Config, layer: &Config) {
        target.default_visible_days = layer.default_visible_days.or(target.default_visible_days);
        target.default_turn_bounds = layer.default_turn_bounds.or(target.default_turn_bounds);
        target.verify_after_commit = layer.verify_after_commit.or(target.verify_after_commit);
        target.enforce_booking_window =
            layer.enforce_booking_window.or(target.enforce_booking_window);
        target.disable_autoinit = layer.disable_autoinit.or(target.disable_autoinit);
        target.maximum_lock_wait_seconds = layer
            .maximum_lock_wait_seconds
            .or(target.maximum_lock_wait_seconds);
        target.output_format = layer.output_format.or(target.output_format);

        target.capacity = match (target.capacity, layer.capacity) {
            (Some(below), Some(above)) => Some(CapacityConfig {
                car: above.car.or(below.car),
                motorcycle: above.motorcycle.or(below.motorcycle),
            }),
            (below, above) => above.or(below),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::OutputFormat;
    use crate::settings::TurnBounds;
    use std::path::PathBuf;

    fn make_source(precedence: u8, config: Config) -> ConfigSource {
        ConfigSource {
            path: PathBuf::from(format!("/test/{precedence}")),
            precedence,
            config,
        }
    }

    #[test]
    fn test_merge_simple_fields() {
        let mut target = Config::default();
        let source = Config {
            verify_after_commit: Some(false),
            output_format: Some(OutputFormat::Csv),
            ..Default::default()
        };
        ConfigMerger::merge_into(&mut target, &source);
        assert_eq!(target.verify_after_commit, Some(false));
        assert_eq!(target.output_format, Some(OutputFormat::Csv));
    }

    #[test]
    fn test_merge_none_values_dont_overwrite() {
        let mut target = Config {
            maximum_lock_wait_seconds: Some(9),
            enforce_booking_window: Some(false),
            ..Default::default()
        };
        ConfigMerger::merge_into(&mut target, &Config::default());
        assert_eq!(target.maximum_lock_wait_seconds, Some(9));
        assert_eq!(target.enforce_booking_window, Some(false));
    }

    #[test]
    fn test_merge_capacity_field_by_field() {
        let mut target = Config {
            capacity: Some(CapacityConfig {
                car: Some(2),
                motorcycle: Some(4),
            }),
            ..Default::default()
        };
        let source = Config {
            capacity: Some(CapacityConfig {
                car: None,
                motorcycle: Some(8),
            }),
            ..Default::default()
        };
        ConfigMerger::merge_into(&mut target, &source);
        let capacity = target.capacity.unwrap();
        assert_eq!(capacity.car, Some(2));
        assert_eq!(capacity.motorcycle, Some(8));
    }

    #[test]
    fn test_merge_turn_bounds_replaced_whole() {
        let mut target = Config::default();
        let bounds = TurnBounds {
            morning_start: 6,
            morning_end: 11,
            afternoon_start: 12,
            afternoon_end: 17,
        };
        let source = Config {
            default_turn_bounds: Some(bounds),
            ..Default::default()
        };
        ConfigMerger::merge_into(&mut target, &source);
        assert_eq!(target.default_turn_bounds, Some(bounds));
    }

    #[test]
    fn test_merge_respects_precedence_not_order() {
        let low = make_source(
            1,
            Config {
                default_visible_days: Some(7),
                ..Default::default()
            },
        );
        let high = make_source(
            5,
            Config {
                default_visible_days: Some(21),
                ..Default::default()
            },
        );
        let merged = ConfigMerger::merge(vec![high, low]);
        assert_eq!(merged.default_visible_days, Some(21));
    }
}
