//! Property-based tests for the configuration system.

use super::merger::ConfigMerger;
use super::schema::{CapacityConfig, Config, OutputFormat};
use super::validator::{ConfigValidator, MAX_SLOT_CAPACITY};
use crate::settings::{TurnBounds, MAX_VISIBLE_DAYS};
use proptest::prelude::*;

fn turn_bounds_strategy() -> impl Strategy<Value = TurnBounds> {
    (0u8..=20)
        .prop_flat_map(|ms| (Just(ms), ms + 1..=21))
        .prop_flat_map(|(ms, me)| (Just(ms), Just(me), me..=22))
        .prop_flat_map(|(ms, me, as_)| (Just(ms), Just(me), Just(as_), as_ + 1..=23))
        .prop_map(
            |(morning_start, morning_end, afternoon_start, afternoon_end)| TurnBounds {
                morning_start,
                morning_end,
                afternoon_start,
                afternoon_end,
            },
        )
}

fn capacity_strategy() -> impl Strategy<Value = CapacityConfig> {
    (
        prop::option::of(1u32..=MAX_SLOT_CAPACITY),
        prop::option::of(1u32..=MAX_SLOT_CAPACITY),
    )
        .prop_map(|(car, motorcycle)| CapacityConfig { car, motorcycle })
}

fn output_format_strategy() -> impl Strategy<Value = OutputFormat> {
    prop_oneof![
        Just(OutputFormat::Json),
        Just(OutputFormat::Csv),
        Just(OutputFormat::Tsv),
        Just(OutputFormat::Table),
    ]
}

fn config_strategy() -> impl Strategy<Value = Config> {
    (
        prop::option::of(1u32..=MAX_VISIBLE_DAYS),
        prop::option::of(turn_bounds_strategy()),
        prop::option::of(capacity_strategy()),
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(1u64..=600),
        prop::option::of(output_format_strategy()),
    )
        .prop_map(
            |(days, bounds, capacity, verify, enforce, lock_wait, format)| Config {
                default_visible_days: days,
                default_turn_bounds: bounds,
                capacity,
                verify_after_commit: verify,
                enforce_booking_window: enforce,
                maximum_lock_wait_seconds: lock_wait,
                output_format: format,
                ..Default::default()
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Higher precedence wins for every field it sets
    #[test]
    fn config_merge_higher_precedence_wins(low in config_strategy(), high in config_strategy()) {
        let mut result = low.clone();
        ConfigMerger::merge_into(&mut result, &high);

        prop_assert_eq!(result.default_visible_days, high.default_visible_days.or(low.default_visible_days));
        prop_assert_eq!(result.default_turn_bounds, high.default_turn_bounds.or(low.default_turn_bounds));
        prop_assert_eq!(result.verify_after_commit, high.verify_after_commit.or(low.verify_after_commit));
        prop_assert_eq!(result.enforce_booking_window, high.enforce_booking_window.or(low.enforce_booking_window));
        prop_assert_eq!(result.output_format, high.output_format.or(low.output_format));

        let car = high.capacity.and_then(|c| c.car).or(low.capacity.and_then(|c| c.car));
        prop_assert_eq!(result.capacity.and_then(|c| c.car), car);
    }

    // Empty config is identity element for merge
    #[test]
    fn config_merge_identity(config in config_strategy()) {
        let mut merged = config.clone();
        ConfigMerger::merge_into(&mut merged, &Config::default());
        prop_assert_eq!(merged, config.clone());

        let mut from_empty = Config::default();
        ConfigMerger::merge_into(&mut from_empty, &config);
        prop_assert_eq!(from_empty, config);
    }

    // Merging the same source twice changes nothing
    #[test]
    fn config_merge_idempotent(base in config_strategy(), source in config_strategy()) {
        let mut once = base.clone();
        ConfigMerger::merge_into(&mut once, &source);
        let mut twice = once.clone();
        ConfigMerger::merge_into(&mut twice, &source);
        prop_assert_eq!(once, twice);
    }

    // Generated configs are valid and survive a YAML round trip
    #[test]
    fn config_valid_and_serializable(config in config_strategy()) {
        prop_assert!(ConfigValidator::validate(&config).is_ok());
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        prop_assert_eq!(parsed, config);
    }

    // Capacities never fall back to zero
    #[test]
    fn config_capacities_positive(config in config_strategy()) {
        let caps = config.capacities();
        prop_assert!(caps.car >= 1);
        prop_assert!(caps.motorcycle >= 1);
    }
}
