//! Booking settings: how far ahead bookings open and where turns begin and
//! end.

pub mod reader;

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::reservation::Turn;
use crate::slot::ValidationError;
use crate::store::{Entity, Field, Record, Value};

/// Longest booking window an administrator may configure, in days.
pub const MAX_VISIBLE_DAYS: u32 = 365;

/// Hour boundaries of the two turns, as hours of the day (0-23).
///
/// A turn covers `start <= hour < end`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use parkbook::{Turn, TurnBounds};
///
/// let bounds = TurnBounds::default();
/// let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
/// let lunch = NaiveTime::from_hms_opt(12, 30, 0).unwrap();
/// assert_eq!(bounds.current_turn(ten), Some(Turn::Morning));
/// assert_eq!(bounds.current_turn(lunch), None);
/// assert_eq!(bounds.default_turn(lunch), Turn::Afternoon);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TurnBounds {
    /// First hour of the morning turn.
    pub morning_start: u8,
    /// Hour at which the morning turn ends.
    pub morning_end: u8,
    /// First hour of the afternoon turn.
    pub afternoon_start: u8,
    /// Hour at which the afternoon turn ends.
    pub afternoon_end: u8,
}

impl Default for TurnBounds {
    fn default() -> Self {
        Self {
            morning_start: 7,
            morning_end: 12,
            afternoon_start: 13,
            afternoon_end: 18,
        }
    }
}

impl TurnBounds {
    /// Checks that every hour is in range and the turns are ordered and
    /// non-overlapping.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending boundary.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, hour) in [
            ("morning_start", self.morning_start),
            ("morning_end", self.morning_end),
            ("afternoon_start", self.afternoon_start),
            ("afternoon_end", self.afternoon_end),
        ] {
            if hour > 23 {
                return Err(ValidationError::new(
                    name,
                    format!("hour {hour} is outside 0-23"),
                ));
            }
        }
        if self.morning_start >= self.morning_end {
            return Err(ValidationError::new(
                "morning_end",
                "morning must end after it starts",
            ));
        }
        if self.morning_end > self.afternoon_start {
            return Err(ValidationError::new(
                "afternoon_start",
                "afternoon must not start before morning ends",
            ));
        }
        if self.afternoon_start >= self.afternoon_end {
            return Err(ValidationError::new(
                "afternoon_end",
                "afternoon must end after it starts",
            ));
        }
        Ok(())
    }

    /// The turn in progress at `time`, if any.
    #[must_use]
    pub fn current_turn(&self, time: NaiveTime) -> Option<Turn> {
        let hour = time.hour();
        if (u32::from(self.morning_start)..u32::from(self.morning_end)).contains(&hour) {
            Some(Turn::Morning)
        } else if (u32::from(self.afternoon_start)..u32::from(self.afternoon_end)).contains(&hour) {
            Some(Turn::Afternoon)
        } else {
            None
        }
    }

    /// Turn to pre-select at `time`: the current turn, else the afternoon
    /// once the morning is over, else the morning.
    #[must_use]
    pub fn default_turn(&self, time: NaiveTime) -> Turn {
        self.current_turn(time).unwrap_or_else(|| {
            if time.hour() >= u32::from(self.morning_end) {
                Turn::Afternoon
            } else {
                Turn::Morning
            }
        })
    }

    /// Human-readable range of a turn, e.g. `07:00-12:00`.
    #[must_use]
    pub fn describe(&self, turn: Turn) -> String {
        let (start, end) = match turn {
            Turn::Morning => (self.morning_start, self.morning_end),
            Turn::Afternoon => (self.afternoon_start, self.afternoon_end),
            Turn::FullDay => (self.morning_start, self.afternoon_end),
        };
        format!("{start:02}:00-{end:02}:00")
    }
}

/// Parses `"7-12,13-18"`: the morning range, a comma, the afternoon range.
/// Whitespace around numbers is ignored. The result is not validated.
impl FromStr for TurnBounds {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ValidationError::new(
                "turn_bounds",
                format!(
                    "expected MORNING_START-MORNING_END,AFTERNOON_START-AFTERNOON_END, got '{s}'"
                ),
            )
        };
        let hours = |part: &str| -> Result<(u8, u8), ValidationError> {
            let (start, end) = part.split_once('-').ok_or_else(invalid)?;
            let start = start.trim().parse().map_err(|_| invalid())?;
            let end = end.trim().parse().map_err(|_| invalid())?;
            Ok((start, end))
        };

        let (morning, afternoon) = s.split_once(',').ok_or_else(invalid)?;
        let (morning_start, morning_end) = hours(morning)?;
        let (afternoon_start, afternoon_end) = hours(afternoon)?;
        Ok(Self {
            morning_start,
            morning_end,
            afternoon_start,
            afternoon_end,
        })
    }
}

impl fmt::Display for TurnBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{},{}-{}",
            self.morning_start, self.morning_end, self.afternoon_start, self.afternoon_end
        )
    }
}

/// Range of dates open for booking, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWindow {
    /// First bookable date.
    pub min_date: NaiveDate,
    /// Last bookable date.
    pub max_date: NaiveDate,
}

impl BookingWindow {
    /// Window starting `today` and spanning `visible_days` further days.
    ///
    /// A window running past the last representable date ends there.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use parkbook::BookingWindow;
    ///
    /// let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    /// let window = BookingWindow::starting(today, 7);
    /// assert_eq!(window.max_date, NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());
    /// assert!(window.contains(today));
    /// assert!(!window.contains(NaiveDate::from_ymd_opt(2025, 3, 18).unwrap()));
    /// ```
    #[must_use]
    pub fn starting(today: NaiveDate, visible_days: u32) -> Self {
        Self {
            min_date: today,
            max_date: today
                .checked_add_days(Days::new(u64::from(visible_days)))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Returns true if `date` is bookable.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min_date <= date && date <= self.max_date
    }
}

impl fmt::Display for BookingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.min_date, self.max_date)
    }
}

/// The settings singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Store identifier.
    pub id: i64,
    /// Days ahead of today that may be booked.
    pub visible_days: u32,
    /// Turn boundaries.
    pub turn_bounds: TurnBounds,
}

impl Record for Settings {
    fn field(&self, field: Field) -> Option<Value> {
        match field {
            Field::Id => Some(Value::Int(self.id)),
            Field::VisibleDays => Some(Value::Int(i64::from(self.visible_days))),
            _ => None,
        }
    }
}

impl Entity for Settings {
    type Id = i64;
    type Fields = NewSettings;
    type Patch = SettingsPatch;

    const NAME: &'static str = "settings";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Settings values to store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSettings {
    /// Days ahead of today that may be booked.
    pub visible_days: u32,
    /// Turn boundaries.
    pub turn_bounds: TurnBounds,
}

impl NewSettings {
    /// Checks the values.
    ///
    /// # Errors
    ///
    /// Returns an error if the window exceeds [`MAX_VISIBLE_DAYS`] or the turn
    /// bounds are invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.visible_days > MAX_VISIBLE_DAYS {
            return Err(ValidationError::new(
                "visible_days",
                format!("must be at most {MAX_VISIBLE_DAYS}"),
            ));
        }
        self.turn_bounds.validate()
    }
}

/// Partial update of the settings singleton.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    /// New window length.
    pub visible_days: Option<u32>,
    /// New turn bounds.
    pub turn_bounds: Option<TurnBounds>,
}

impl SettingsPatch {
    /// Applies the patch in place.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(days) = self.visible_days {
            settings.visible_days = days;
        }
        if let Some(bounds) = self.turn_bounds {
            settings.turn_bounds = bounds;
        }
    }
}

impl From<NewSettings> for SettingsPatch {
    fn from(values: NewSettings) -> Self {
        Self {
            visible_days: Some(values.visible_days),
            turn_bounds: Some(values.turn_bounds),
        }
    }
}
