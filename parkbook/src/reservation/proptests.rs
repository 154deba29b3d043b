//! Property-based tests for reservation types and filters.

use super::store::{requester_date_turn_filter, slot_date_turn_filter};
use super::{normalize_email, NewReservation, ReservationId, ReservationStatus, Turn};
use crate::slot::{SlotId, VehicleType};
use crate::store::Record;
use chrono::{NaiveDate, Utc};
use proptest::prelude::*;

fn turn_strategy() -> impl Strategy<Value = Turn> {
    prop_oneof![Just(Turn::Morning), Just(Turn::Afternoon), Just(Turn::FullDay)]
}

fn persisted_turn_strategy() -> impl Strategy<Value = Turn> {
    prop_oneof![Just(Turn::Morning), Just(Turn::Afternoon)]
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..730).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Duration::days(offset)
    })
}

fn email_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,8}@[A-Za-z]{1,8}\\.(com|org)"
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Normalizing twice gives the same address
    #[test]
    fn email_normalization_idempotent(email in email_strategy(), pad in " {0,3}") {
        let once = normalize_email(&format!("{pad}{email}{pad}")).unwrap();
        let twice = normalize_email(&once).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once, email.to_lowercase());
    }

    // Implied turns are always persisted turns
    #[test]
    fn implied_turns_are_persisted(turn in turn_strategy()) {
        for implied in turn.implied() {
            prop_assert_ne!(*implied, Turn::FullDay);
            prop_assert!(turn.occupies(*implied));
        }
    }

    // The slot filter selects a row exactly when its turn occupies the queried turn
    #[test]
    fn slot_filter_agrees_with_occupies(
        stored in turn_strategy(),
        queried in turn_strategy(),
        date in date_strategy(),
        slot in 1i64..10,
    ) {
        let mut row = NewReservation::new(
            SlotId::new(slot), date, Turn::Morning, VehicleType::Car, "a@x.com", "A",
        )
        .unwrap()
        .into_reservation(ReservationId::new(1), Utc::now());
        row.turn = stored;

        let filter = slot_date_turn_filter(SlotId::new(slot), date, queried);
        prop_assert_eq!(filter.matches(&row), stored.occupies(queried));

        row.status = ReservationStatus::Cancelled;
        prop_assert!(!filter.matches(&row));
    }

    // The requester filter ignores case and only matches the same date
    #[test]
    fn requester_filter_matches_case_insensitively(
        email in email_strategy(),
        turn in persisted_turn_strategy(),
        date in date_strategy(),
        other_date in date_strategy(),
    ) {
        let row = NewReservation::new(SlotId::new(1), date, turn, VehicleType::Motorcycle, &email, "X")
            .unwrap()
            .into_reservation(ReservationId::new(1), Utc::now());

        let upper = email.to_uppercase();
        prop_assert!(requester_date_turn_filter(&upper, date, turn).matches(&row));
        prop_assert_eq!(
            requester_date_turn_filter(&email, other_date, turn).matches(&row),
            other_date == date
        );
        prop_assert!(row.field(crate::store::Field::RequesterEmail).is_some());
    }
}
