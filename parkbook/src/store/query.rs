//! Typed query model.
//!
//! Predicates are built from a closed set of [`Field`]s and typed
//! [`Value`]s instead of hand-assembled strings, so a misspelled field is a
//! compile error and user-supplied text is always bound as a parameter by
//! the back-end. The `Display` rendering is an OData-style predicate used in
//! log output.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

use super::Record;

/// Addressable field of a stored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Record identifier (all entities).
    Id,
    /// Slot display code.
    Code,
    /// Vehicle type (slots and reservations).
    VehicleType,
    /// Slot active flag.
    Active,
    /// Slot assignment mode.
    AssignmentMode,
    /// Owning slot of a reservation.
    SlotId,
    /// Reservation date.
    Date,
    /// Reservation turn.
    Turn,
    /// Reservation status.
    Status,
    /// Requester e-mail.
    RequesterEmail,
    /// Requester display name.
    RequesterName,
    /// Reservation creation time, as Unix seconds.
    CreatedAt,
    /// Settings booking window length.
    VisibleDays,
}

impl Field {
    /// Name used when rendering predicates.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "Id",
            Self::Code => "Code",
            Self::VehicleType => "VehicleType",
            Self::Active => "Active",
            Self::AssignmentMode => "AssignmentMode",
            Self::SlotId => "SlotId",
            Self::Date => "Date",
            Self::Turn => "Turn",
            Self::Status => "Status",
            Self::RequesterEmail => "RequesterEmail",
            Self::RequesterName => "RequesterName",
            Self::CreatedAt => "CreatedAt",
            Self::VisibleDays => "VisibleDays",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Value {
    /// Integer value (identifiers, counts, timestamps).
    Int(i64),
    /// Boolean flag.
    Bool(bool),
    /// Text value (codes, enums in stored form, e-mails).
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Self::Date(v) => write!(f, "'{}'", v.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

/// A boolean predicate over record fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value.
    Eq(Field, Value),
    /// Field differs from value.
    Ne(Field, Value),
    /// Field is greater than or equal to value.
    Gte(Field, Value),
    /// Field is less than or equal to value.
    Lte(Field, Value),
    /// Text field contains the needle, ignoring case.
    Contains(Field, String),
    /// Every sub-filter matches.
    And(Vec<Filter>),
    /// At least one sub-filter matches.
    Or(Vec<Filter>),
    /// The sub-filter does not match.
    Not(Box<Filter>),
}

impl Filter {
    /// `field eq value`.
    pub fn eq(field: Field, value: impl Into<Value>) -> Self {
        Self::Eq(field, value.into())
    }

    /// `field ne value`.
    pub fn ne(field: Field, value: impl Into<Value>) -> Self {
        Self::Ne(field, value.into())
    }

    /// `field ge value`.
    pub fn gte(field: Field, value: impl Into<Value>) -> Self {
        Self::Gte(field, value.into())
    }

    /// `field le value`.
    pub fn lte(field: Field, value: impl Into<Value>) -> Self {
        Self::Lte(field, value.into())
    }

    /// Case-insensitive substring match.
    pub fn contains(field: Field, needle: impl Into<String>) -> Self {
        Self::Contains(field, needle.into())
    }

    /// Conjunction, flattening nested `And`s.
    #[must_use]
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), other) => {
                left.push(other);
                Self::And(left)
            }
            (this, Self::And(mut right)) => {
                right.insert(0, this);
                Self::And(right)
            }
            (this, other) => Self::And(vec![this, other]),
        }
    }

    /// Disjunction, flattening nested `Or`s.
    #[must_use]
    pub fn or(self, other: Filter) -> Self {
        match (self, other) {
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), other) => {
                left.push(other);
                Self::Or(left)
            }
            (this, other) => Self::Or(vec![this, other]),
        }
    }

    /// Negation.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluates the filter against a record.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            Self::Eq(field, value) => record.field(*field).as_ref() == Some(value),
            Self::Ne(field, value) => record.field(*field).is_some_and(|v| &v != value),
            Self::Gte(field, value) => record
                .field(*field)
                .and_then(|v| v.partial_cmp(value))
                .is_some_and(Ordering::is_ge),
            Self::Lte(field, value) => record
                .field(*field)
                .and_then(|v| v.partial_cmp(value))
                .is_some_and(Ordering::is_le),
            Self::Contains(field, needle) => match record.field(*field) {
                Some(Value::Text(text)) => text.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            Self::And(filters) => filters.iter().all(|f| f.matches(record)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(record)),
            Self::Not(filter) => !filter.matches(record),
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(_) | Self::Or(_) => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq(field, value) => write!(f, "{field} eq {value}"),
            Self::Ne(field, value) => write!(f, "{field} ne {value}"),
            Self::Gte(field, value) => write!(f, "{field} ge {value}"),
            Self::Lte(field, value) => write!(f, "{field} le {value}"),
            Self::Contains(field, needle) => write!(
                f,
                "contains(tolower({field}), {})",
                Value::Text(needle.to_lowercase())
            ),
            Self::And(filters) | Self::Or(filters) => {
                let joiner = if matches!(self, Self::And(_)) {
                    " and "
                } else {
                    " or "
                };
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    filter.fmt_nested(f)?;
                }
                Ok(())
            }
            Self::Not(filter) => write!(f, "not ({filter})"),
        }
    }
}

/// Sort key of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    /// Field to sort on.
    pub field: Field,
    /// Sort descending instead of ascending.
    pub descending: bool,
}

/// A `get_all` request: optional filter, ordering and row limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Rows must match this filter; `None` selects everything.
    pub filter: Option<Filter>,
    /// Sort keys, applied in order. Empty means ascending by id.
    pub order_by: Vec<OrderBy>,
    /// Maximum number of rows returned.
    pub top: Option<usize>,
}

impl Query {
    /// An unfiltered query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Adds an ascending sort key.
    #[must_use]
    pub fn order_by(mut self, field: Field) -> Self {
        self.order_by.push(OrderBy {
            field,
            descending: false,
        });
        self
    }

    /// Adds a descending sort key.
    #[must_use]
    pub fn order_by_desc(mut self, field: Field) -> Self {
        self.order_by.push(OrderBy {
            field,
            descending: true,
        });
        self
    }

    /// Limits the number of rows.
    #[must_use]
    pub const fn top(mut self, n: usize) -> Self {
        self.top = Some(n);
        self
    }

    /// Applies filter, ordering and limit to an in-memory record set.
    pub fn apply<R: Record + Clone>(&self, records: &[R]) -> Vec<R> {
        let mut rows: Vec<R> = records
            .iter()
            .filter(|r| self.filter.as_ref().map_or(true, |f| f.matches(*r)))
            .cloned()
            .collect();

        let keys: Vec<OrderBy> = if self.order_by.is_empty() {
            vec![OrderBy {
                field: Field::Id,
                descending: false,
            }]
        } else {
            self.order_by.clone()
        };

        rows.sort_by(|a, b| {
            for key in &keys {
                let ordering = compare_optional(a.field(key.field), b.field(key.field));
                let ordering = if key.descending {
                    ordering.reverse()
                } else {
                    ordering
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        if let Some(top) = self.top {
            rows.truncate(top);
        }
        rows
    }
}

fn compare_optional(a: Option<Value>, b: Option<Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
