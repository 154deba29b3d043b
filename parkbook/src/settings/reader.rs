//! Access to the settings singleton.

use chrono::NaiveDate;

use super::{BookingWindow, NewSettings, Settings, SettingsPatch, TurnBounds};
use crate::error::{Error, Result};
use crate::store::{ListStore, Query};

/// Reads and saves the settings singleton.
///
/// Readers treat a missing or unreadable record as
/// [`Error::ConfigUnavailable`]; the `_or_default` variants fall back to
/// caller-supplied values and log a warning instead.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use parkbook::settings::reader::SettingsReader;
/// use parkbook::store::MemoryStore;
/// use parkbook::{NewSettings, TurnBounds};
///
/// let store = MemoryStore::new();
/// let reader = SettingsReader::new(&store);
/// let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// assert!(reader.booking_window(today).is_err());
///
/// reader
///     .save(NewSettings { visible_days: 14, turn_bounds: TurnBounds::default() })
///     .unwrap();
/// let window = reader.booking_window(today).unwrap();
/// assert_eq!(window.max_date, NaiveDate::from_ymd_opt(2025, 3, 24).unwrap());
/// ```
pub struct SettingsReader<'a, S: ListStore<Settings> + ?Sized> {
    store: &'a S,
}

impl<'a, S: ListStore<Settings> + ?Sized> SettingsReader<'a, S> {
    /// Wraps a store.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The stored record, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn find(&self) -> Result<Option<Settings>> {
        let rows = self.store.get_all(&Query::new().top(1))?;
        Ok(rows.into_iter().next())
    }

    /// The stored record, checked against the same rules as [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns `ConfigUnavailable` if the record is missing, cannot be read
    /// or holds out-of-range values.
    pub fn load(&self) -> Result<Settings> {
        match self.find() {
            Ok(Some(settings)) => {
                let values = NewSettings {
                    visible_days: settings.visible_days,
                    turn_bounds: settings.turn_bounds,
                };
                values
                    .validate()
                    .map(|()| settings)
                    .map_err(|e| Error::ConfigUnavailable {
                        reason: format!("stored settings are invalid: {e}"),
                    })
            }
            Ok(None) => Err(Error::ConfigUnavailable {
                reason: "no settings record exists".to_string(),
            }),
            Err(e) => Err(Error::ConfigUnavailable {
                reason: e.to_string(),
            }),
        }
    }

    /// Dates open for booking as of `today`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigUnavailable` if the record is missing or cannot be read.
    pub fn booking_window(&self, today: NaiveDate) -> Result<BookingWindow> {
        let settings = self.load()?;
        Ok(BookingWindow::starting(today, settings.visible_days))
    }

    /// Like [`booking_window`](Self::booking_window), falling back to
    /// `default_days` when settings are unavailable.
    pub fn booking_window_or_default(&self, today: NaiveDate, default_days: u32) -> BookingWindow {
        self.booking_window(today).unwrap_or_else(|e| {
            log::warn!("{e}; using default booking window of {default_days} days");
            BookingWindow::starting(today, default_days)
        })
    }

    /// Stored turn boundaries.
    ///
    /// # Errors
    ///
    /// Returns `ConfigUnavailable` if the record is missing or cannot be read.
    pub fn turn_bounds(&self) -> Result<TurnBounds> {
        Ok(self.load()?.turn_bounds)
    }

    /// Like [`turn_bounds`](Self::turn_bounds), falling back to `default`
    /// when settings are unavailable.
    pub fn turn_bounds_or_default(&self, default: TurnBounds) -> TurnBounds {
        self.turn_bounds().unwrap_or_else(|e| {
            log::warn!("{e}; using default turn bounds");
            default
        })
    }

    /// Validates and stores the singleton, creating it on first save.
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-range values, or an error if the
    /// store fails.
    pub fn save(&self, values: NewSettings) -> Result<Settings> {
        values.validate()?;
        match self.find()? {
            Some(existing) => {
                log::debug!("updating settings {}", existing.id);
                self.store.update(existing.id, SettingsPatch::from(values))
            }
            None => {
                log::debug!("creating settings record");
                self.store.create(values)
            }
        }
    }
}
