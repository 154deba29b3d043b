//! Data-access layer shared by every component.
//!
//! The core never talks to a concrete storage engine. It goes through
//! [`ListStore`], a per-entity collaborator with `get_all`/`create`/
//! `update`/`delete`, and expresses every read as a typed [`Query`]. Each
//! back-end translates queries to its own protocol at the edge: the SQLite
//! [`Database`](crate::Database) renders parameterized SQL, and
//! [`MemoryStore`] evaluates filters directly.
//!
//! # Examples
//!
//! ```
//! use parkbook::store::{Field, Filter, Query};
//! use parkbook::VehicleType;
//!
//! let query = Query::new()
//!     .filter(
//!         Filter::eq(Field::VehicleType, VehicleType::Car)
//!             .and(Filter::eq(Field::Active, true)),
//!     )
//!     .order_by(Field::Code);
//! assert_eq!(
//!     query.filter.unwrap().to_string(),
//!     "VehicleType eq 'Car' and Active eq true"
//! );
//! ```

mod memory;
mod query;

use std::fmt;

use crate::error::Result;
use crate::reservation::Reservation;
use crate::settings::Settings;
use crate::slot::Slot;

pub use memory::{FailurePoint, MemoryStore};
pub use query::{Field, Filter, OrderBy, Query, Value};

/// A record whose fields can be addressed by [`Field`].
///
/// Returning `None` means the record has no such field; filters on missing
/// fields never match.
pub trait Record {
    /// Value of `field` on this record.
    fn field(&self, field: Field) -> Option<Value>;
}

/// A persisted entity managed through a [`ListStore`].
pub trait Entity: Record + Clone {
    /// Identifier type.
    type Id: Copy + Eq + fmt::Display + fmt::Debug;
    /// Fields needed to create the entity.
    type Fields;
    /// Partial update.
    type Patch;

    /// Human-readable entity name used in errors and logs.
    const NAME: &'static str;

    /// Identifier of this record.
    fn id(&self) -> Self::Id;
}

/// Generic data-access collaborator for one entity.
///
/// Implementations take `&self`; back-ends needing mutation use interior
/// mutability or a connection that allows shared writes.
pub trait ListStore<E: Entity> {
    /// Returns every record matching `query`, honoring its ordering and limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn get_all(&self, query: &Query) -> Result<Vec<E>>;

    /// Creates a record and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn create(&self, fields: E::Fields) -> Result<E>;

    /// Applies a partial update and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has this id, or an error if the write fails.
    fn update(&self, id: E::Id, patch: E::Patch) -> Result<E>;

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has this id, or an error if the write fails.
    fn delete(&self, id: E::Id) -> Result<()>;
}

/// A store that serves all three entities the engine needs.
pub trait DataStore: ListStore<Slot> + ListStore<Reservation> + ListStore<Settings> {}

impl<T> DataStore for T where T: ListStore<Slot> + ListStore<Reservation> + ListStore<Settings> {}

pub(crate) fn not_found<E: Entity>(id: E::Id) -> crate::Error {
    crate::Error::NotFound {
        resource: format!("{} {id}", E::NAME),
    }
}
