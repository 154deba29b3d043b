//! Property-based tests for the allocation engine.

use std::collections::HashMap;

use super::{AllocationEngine, AllocationPolicy, AllocationRequest};
use crate::reservation::{NewReservation, Reservation, Turn};
use crate::slot::catalog::SlotCatalog;
use crate::slot::{AssignmentMode, NewSlot, Slot, SlotId, VehicleType};
use crate::store::{FailurePoint, MemoryStore};
use chrono::NaiveDate;
use proptest::prelude::*;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn turn_strategy() -> impl Strategy<Value = Turn> {
    prop_oneof![Just(Turn::Morning), Just(Turn::Afternoon), Just(Turn::FullDay)]
}

fn vehicle_strategy() -> impl Strategy<Value = VehicleType> {
    prop_oneof![Just(VehicleType::Car), Just(VehicleType::Motorcycle)]
}

/// (vehicle, turn, requester index, day offset)
fn request_strategy() -> impl Strategy<Value = (VehicleType, Turn, usize, u64)> {
    (vehicle_strategy(), turn_strategy(), 0usize..8, 0u64..3)
}

fn seed(store: &MemoryStore, cars: usize, motorcycles: usize) -> Vec<Slot> {
    let catalog = SlotCatalog::new(store);
    let mut slots = Vec::new();
    for i in 0..cars {
        let code = format!("A-{i:02}");
        slots.push(
            catalog
                .add(NewSlot::new(&code, VehicleType::Car, AssignmentMode::Itinerant).unwrap())
                .unwrap(),
        );
    }
    for i in 0..motorcycles {
        let code = format!("M-{i:02}");
        slots.push(
            catalog
                .add(NewSlot::new(&code, VehicleType::Motorcycle, AssignmentMode::Itinerant).unwrap())
                .unwrap(),
        );
    }
    slots
}

fn active(store: &MemoryStore) -> Vec<Reservation> {
    store
        .reservations()
        .into_iter()
        .filter(Reservation::is_active)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    // No slot exceeds its capacity and no requester holds a turn twice
    #[test]
    fn allocations_respect_capacity_and_requester_rules(
        cars in 0usize..3,
        motorcycles in 0usize..3,
        requests in prop::collection::vec(request_strategy(), 1..40),
    ) {
        let store = MemoryStore::new();
        let slots = seed(&store, cars, motorcycles);
        let policy = AllocationPolicy::default();
        let engine = AllocationEngine::new(&store, policy);

        for (vehicle_type, turn, who, offset) in requests {
            let date = today() + chrono::Days::new(offset);
            let email = format!("user{who}@x.com");
            let request = AllocationRequest::new(vehicle_type, turn, date, &email, &email).unwrap();
            let _ = engine.allocate(&request, today());
        }

        let capacity: HashMap<SlotId, u32> = slots
            .iter()
            .map(|s| (s.id, policy.capacities.for_vehicle(s.vehicle_type)))
            .collect();
        let mut per_slot: HashMap<(SlotId, NaiveDate, Turn), u32> = HashMap::new();
        let mut per_requester: HashMap<(String, NaiveDate, Turn), u32> = HashMap::new();
        for row in active(&store) {
            prop_assert_ne!(row.turn, Turn::FullDay);
            *per_slot.entry((row.slot_id, row.date, row.turn)).or_default() += 1;
            *per_requester.entry((row.requester_email, row.date, row.turn)).or_default() += 1;
        }
        for ((slot_id, _, _), count) in per_slot {
            prop_assert!(count <= capacity[&slot_id]);
        }
        for (_, count) in per_requester {
            prop_assert_eq!(count, 1);
        }
    }

    // A full-day request leaves exactly zero or two rows, whatever write fails
    #[test]
    fn full_day_is_all_or_nothing(
        slots in 1usize..4,
        failing_create in 1usize..6,
    ) {
        let store = MemoryStore::new();
        seed(&store, slots, 0);
        store.fail_at(FailurePoint::NthReservationCreate(failing_create));
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let request = AllocationRequest::new(
            VehicleType::Car, Turn::FullDay, today(), "a@x.com", "A",
        ).unwrap();
        let result = engine.allocate(&request, today());

        let rows = active(&store);
        prop_assert!(rows.len() == 0 || rows.len() == 2);
        prop_assert_eq!(result.is_ok(), rows.len() == 2);
        if rows.len() == 2 {
            prop_assert_eq!(rows[0].slot_id, rows[1].slot_id);
        }
    }

    // With the first `full` slots taken, the next slot in code order wins
    #[test]
    fn fallback_picks_first_free_candidate(total in 1usize..6, full in 0usize..6) {
        let full = full.min(total);
        let store = MemoryStore::new();
        let slots = seed(&store, total, 0);
        for (i, slot) in slots.iter().take(full).enumerate() {
            let row = NewReservation::new(
                slot.id, today(), Turn::Morning, VehicleType::Car, &format!("other{i}@x.com"), "O",
            ).unwrap();
            crate::reservation::store::ReservationStore::new(&store).create(row).unwrap();
        }
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());

        let request = AllocationRequest::new(
            VehicleType::Car, Turn::Morning, today(), "a@x.com", "A",
        ).unwrap();
        match engine.allocate(&request, today()) {
            Ok(allocation) => {
                prop_assert!(full < total);
                prop_assert_eq!(allocation.slot_id, slots[full].id);
            }
            Err(err) => {
                prop_assert_eq!(full, total);
                let no_availability = matches!(err, crate::Error::NoAvailability { .. });
                prop_assert!(no_availability);
            }
        }
    }

    // Cancelling any number of times leaves the row cancelled
    #[test]
    fn cancellation_idempotent(times in 1usize..5) {
        let store = MemoryStore::new();
        seed(&store, 1, 0);
        let engine = AllocationEngine::new(&store, AllocationPolicy::default());
        let request = AllocationRequest::new(
            VehicleType::Car, Turn::Afternoon, today(), "a@x.com", "A",
        ).unwrap();
        let id = engine.allocate(&request, today()).unwrap().reservations[0].id;

        let first = engine.cancel(id).unwrap();
        for _ in 1..times {
            prop_assert_eq!(&engine.cancel(id).unwrap(), &first);
        }
        prop_assert!(active(&store).is_empty());
    }
}
