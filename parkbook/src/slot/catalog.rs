//! Slot listing and administration.

use super::{validate_code, AssignmentMode, NewSlot, Slot, SlotId, SlotPatch, VehicleType};
use crate::error::{Error, Result};
use crate::reservation::store::ReservationStore;
use crate::reservation::Reservation;
use crate::store::{not_found, Field, Filter, ListStore, Query};

/// Criteria for listing slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotFilter {
    /// Only this vehicle type.
    pub vehicle_type: Option<VehicleType>,
    /// Only this assignment mode.
    pub assignment_mode: Option<AssignmentMode>,
    /// Skip inactive slots.
    pub active_only: bool,
    /// Only codes containing this text, ignoring case.
    pub code_contains: Option<String>,
}

impl SlotFilter {
    fn to_filter(&self) -> Option<Filter> {
        let mut parts = Vec::new();
        if let Some(vehicle_type) = self.vehicle_type {
            parts.push(Filter::eq(Field::VehicleType, vehicle_type));
        }
        if let Some(mode) = self.assignment_mode {
            parts.push(Filter::eq(Field::AssignmentMode, mode));
        }
        if self.active_only {
            parts.push(Filter::eq(Field::Active, true));
        }
        if let Some(needle) = &self.code_contains {
            parts.push(Filter::contains(Field::Code, needle.clone()));
        }
        parts.into_iter().reduce(Filter::and)
    }
}

/// The slot catalog.
///
/// # Examples
///
/// ```
/// use parkbook::slot::catalog::SlotCatalog;
/// use parkbook::store::MemoryStore;
/// use parkbook::{AssignmentMode, NewSlot, VehicleType};
///
/// let store = MemoryStore::new();
/// let catalog = SlotCatalog::new(&store);
/// for code in ["B-02", "A-01"] {
///     catalog
///         .add(NewSlot::new(code, VehicleType::Car, AssignmentMode::Itinerant).unwrap())
///         .unwrap();
/// }
/// let codes: Vec<_> = catalog
///     .list_eligible_slots(VehicleType::Car, AssignmentMode::Itinerant)
///     .unwrap()
///     .into_iter()
///     .map(|s| s.code)
///     .collect();
/// assert_eq!(codes, vec!["A-01", "B-02"]);
/// ```
pub struct SlotCatalog<'a, S: ListStore<Slot> + ?Sized> {
    store: &'a S,
}

impl<'a, S: ListStore<Slot> + ?Sized> SlotCatalog<'a, S> {
    /// Wraps a store.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Active slots of a vehicle type and assignment mode, by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn list_eligible_slots(
        &self,
        vehicle_type: VehicleType,
        assignment_mode: AssignmentMode,
    ) -> Result<Vec<Slot>> {
        let filter = Filter::eq(Field::VehicleType, vehicle_type)
            .and(Filter::eq(Field::AssignmentMode, assignment_mode))
            .and(Filter::eq(Field::Active, true));
        log::debug!("querying slots: {filter}");
        self.store
            .get_all(&Query::new().filter(filter).order_by(Field::Code))
    }

    /// Every slot, by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn list_all(&self) -> Result<Vec<Slot>> {
        self.list(&SlotFilter::default())
    }

    /// Slots matching `criteria`, by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn list(&self, criteria: &SlotFilter) -> Result<Vec<Slot>> {
        let mut query = Query::new().order_by(Field::Code);
        query.filter = criteria.to_filter();
        self.store.get_all(&query)
    }

    /// Looks up a slot by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or an error if the store cannot
    /// be queried.
    pub fn get(&self, id: SlotId) -> Result<Slot> {
        self.store
            .get_all(&Query::new().filter(Filter::eq(Field::Id, id)).top(1))?
            .into_iter()
            .next()
            .ok_or_else(|| not_found::<Slot>(id))
    }

    /// Looks up a slot by its exact code.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn find_by_code(&self, code: &str) -> Result<Option<Slot>> {
        let rows = self.store.get_all(
            &Query::new()
                .filter(Filter::eq(Field::Code, code.trim()))
                .top(1),
        )?;
        Ok(rows.into_iter().next())
    }

    /// Looks up a slot by code, failing when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown code, or an error if the store
    /// cannot be queried.
    pub fn get_by_code(&self, code: &str) -> Result<Slot> {
        self.find_by_code(code)?.ok_or_else(|| Error::NotFound {
            resource: format!("slot '{}'", code.trim()),
        })
    }

    /// Adds a slot.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the code is taken, or an error if the
    /// store fails.
    pub fn add(&self, slot: NewSlot) -> Result<Slot> {
        let code = validate_code(&slot.code)?;
        self.ensure_code_free(&code, None)?;
        let created = self.store.create(NewSlot { code, ..slot })?;
        log::debug!("added slot {} ({})", created.code, created.id);
        Ok(created)
    }

    /// Edits a slot.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, a validation error for a bad or
    /// taken code, or an error if the store fails.
    pub fn update(&self, id: SlotId, mut patch: SlotPatch) -> Result<Slot> {
        if patch.is_empty() {
            return self.get(id);
        }
        if let Some(code) = patch.code.take() {
            let code = validate_code(&code)?;
            self.ensure_code_free(&code, Some(id))?;
            patch.code = Some(code);
        }
        self.store.update(id, patch)
    }

    /// Activates or deactivates a slot. Deactivated slots keep their
    /// reservations but are never offered again.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or an error if the store fails.
    pub fn set_active(&self, id: SlotId, active: bool) -> Result<Slot> {
        self.store.update(id, SlotPatch::active(active))
    }

    fn ensure_code_free(&self, code: &str, except: Option<SlotId>) -> Result<()> {
        match self.find_by_code(code)? {
            Some(existing) if Some(existing.id) != except => Err(Error::Validation {
                field: "code".into(),
                message: format!("slot code '{code}' already exists"),
            }),
            _ => Ok(()),
        }
    }
}

impl<'a, S> SlotCatalog<'a, S>
where
    S: ListStore<Slot> + ListStore<Reservation> + ?Sized,
{
    /// Deletes a slot together with every reservation referencing it.
    ///
    /// Returns the number of reservations removed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or an error if the store fails.
    /// Reservations deleted before a failure stay deleted; the slot itself
    /// is only removed once all of them are gone.
    pub fn remove(&self, id: SlotId) -> Result<usize> {
        let slot = self.get(id)?;
        let removed = ReservationStore::new(self.store).delete_for_slot(id)?;
        <S as ListStore<Slot>>::delete(self.store, id)?;
        log::debug!("removed slot {} and {removed} reservation(s)", slot.code);
        Ok(removed)
    }
}
