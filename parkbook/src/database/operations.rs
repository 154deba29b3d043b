//! [`ListStore`] implementations backed by `SQLite`.
//!
//! Reads run as plain statements. Every write runs in its own IMMEDIATE
//! transaction so concurrent writers from other processes serialize on the
//! database lock.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, params_from_iter, ErrorCode, Row};

use crate::error::{Error, Result};
use crate::reservation::{
    NewReservation, Reservation, ReservationId, ReservationPatch, ReservationStatus, Turn,
};
use crate::settings::{NewSettings, Settings, SettingsPatch, TurnBounds};
use crate::slot::{NewSlot, Slot, SlotId, SlotPatch};
use crate::store::{not_found, Field, ListStore, Query};

use super::connection::Database;
use super::schema::{
    INSERT_RESERVATION, INSERT_SETTINGS, INSERT_SLOT, RESERVATION_COLUMNS, SETTINGS_COLUMNS,
    SLOT_COLUMNS, UPDATE_RESERVATION_STATUS, UPDATE_SETTINGS, UPDATE_SLOT,
};
use super::sql::{render_query, ColumnMap};

/// Wraps a parse failure so it can travel through rusqlite's row mapping.
fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

fn slot_column(field: Field) -> Option<&'static str> {
    match field {
        Field::Id => Some("id"),
        Field::Code => Some("code"),
        Field::VehicleType => Some("vehicle_type"),
        Field::Active => Some("active"),
        Field::AssignmentMode => Some("assignment_mode"),
        _ => None,
    }
}

fn reservation_column(field: Field) -> Option<&'static str> {
    match field {
        Field::Id => Some("id"),
        Field::SlotId => Some("slot_id"),
        Field::Date => Some("date"),
        Field::Turn => Some("turn"),
        Field::VehicleType => Some("vehicle_type"),
        Field::RequesterEmail => Some("requester_email"),
        Field::RequesterName => Some("requester_name"),
        Field::Status => Some("status"),
        Field::CreatedAt => Some("created_at"),
        _ => None,
    }
}

fn settings_column(field: Field) -> Option<&'static str> {
    match field {
        Field::Id => Some("id"),
        Field::VisibleDays => Some("visible_days"),
        _ => None,
    }
}

fn row_to_slot(row: &Row<'_>) -> rusqlite::Result<Slot> {
    let vehicle_type: String = row.get(2)?;
    let assignment_mode: String = row.get(4)?;
    Ok(Slot {
        id: SlotId::new(row.get(0)?),
        code: row.get(1)?,
        vehicle_type: vehicle_type.parse().map_err(|e| conversion_error(2, e))?,
        active: row.get(3)?,
        assignment_mode: assignment_mode.parse().map_err(|e| conversion_error(4, e))?,
    })
}

fn row_to_reservation(row: &Row<'_>) -> rusqlite::Result<Reservation> {
    let date: String = row.get(2)?;
    let turn: String = row.get(3)?;
    let vehicle_type: String = row.get(4)?;
    let status: String = row.get(7)?;
    let created_secs: i64 = row.get(8)?;
    Ok(Reservation {
        id: ReservationId::new(row.get(0)?),
        slot_id: SlotId::new(row.get(1)?),
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| conversion_error(2, e))?,
        turn: Turn::from_stored(&turn),
        vehicle_type: vehicle_type.parse().map_err(|e| conversion_error(4, e))?,
        requester_email: row.get(5)?,
        requester_name: row.get(6)?,
        status: status.parse().map_err(|e| conversion_error(7, e))?,
        created_at: DateTime::from_timestamp(created_secs, 0).unwrap_or_default(),
    })
}

fn row_to_settings(row: &Row<'_>) -> rusqlite::Result<Settings> {
    Ok(Settings {
        id: row.get(0)?,
        visible_days: row.get(1)?,
        turn_bounds: TurnBounds {
            morning_start: row.get(2)?,
            morning_end: row.get(3)?,
            afternoon_start: row.get(4)?,
            afternoon_end: row.get(5)?,
        },
    })
}

impl Database {
    fn select<T>(
        &self,
        table: &str,
        column_list: &str,
        columns: ColumnMap,
        query: &Query,
        map_row: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let tail = render_query(query, columns);
        let sql = format!("SELECT {column_list} FROM {table}{}", tail.sql);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(tail.params.iter()), map_row)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }

    fn delete_by_id(&self, table: &str, id: i64) -> Result<bool> {
        let tx = self.immediate()?;
        let changed = tx.execute(&format!("DELETE FROM {table} WHERE id = ?"), [id])?;
        tx.commit().map_err(|e| self.map_busy(e))?;
        Ok(changed > 0)
    }

    fn duplicate_code(&self, err: rusqlite::Error, code: &str) -> Error {
        match err {
            rusqlite::Error::SqliteFailure(ref sqlite_err, _)
                if sqlite_err.code == ErrorCode::ConstraintViolation =>
            {
                Error::Validation {
                    field: "code".into(),
                    message: format!("slot code '{code}' already exists"),
                }
            }
            other => self.map_busy(other),
        }
    }
}

impl ListStore<Slot> for Database {
    fn get_all(&self, query: &Query) -> Result<Vec<Slot>> {
        self.select("slots", SLOT_COLUMNS, slot_column, query, row_to_slot)
    }

    fn create(&self, fields: NewSlot) -> Result<Slot> {
        let tx = self.immediate()?;
        tx.execute(
            INSERT_SLOT,
            params![
                fields.code,
                fields.vehicle_type.as_str(),
                fields.active,
                fields.assignment_mode.as_str()
            ],
        )
        .map_err(|e| self.duplicate_code(e, &fields.code))?;
        let id = SlotId::new(tx.last_insert_rowid());
        tx.commit().map_err(|e| self.map_busy(e))?;
        Ok(Slot {
            id,
            code: fields.code,
            vehicle_type: fields.vehicle_type,
            active: fields.active,
            assignment_mode: fields.assignment_mode,
        })
    }

    fn update(&self, id: SlotId, patch: SlotPatch) -> Result<Slot> {
        let tx = self.immediate()?;
        let mut slot = tx
            .query_row(
                &format!("SELECT {SLOT_COLUMNS} FROM slots WHERE id = ?"),
                [id.value()],
                row_to_slot,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => not_found::<Slot>(id),
                other => Error::Database(other),
            })?;
        patch.apply(&mut slot);
        tx.execute(
            UPDATE_SLOT,
            params![
                slot.code,
                slot.vehicle_type.as_str(),
                slot.active,
                slot.assignment_mode.as_str(),
                id.value()
            ],
        )
        .map_err(|e| self.duplicate_code(e, &slot.code))?;
        tx.commit().map_err(|e| self.map_busy(e))?;
        Ok(slot)
    }

    fn delete(&self, id: SlotId) -> Result<()> {
        if self.delete_by_id("slots", id.value())? {
            Ok(())
        } else {
            Err(not_found::<Slot>(id))
        }
    }
}

impl ListStore<Reservation> for Database {
    fn get_all(&self, query: &Query) -> Result<Vec<Reservation>> {
        self.select(
            "reservations",
            RESERVATION_COLUMNS,
            reservation_column,
            query,
            row_to_reservation,
        )
    }

    fn create(&self, fields: NewReservation) -> Result<Reservation> {
        let created_at = Utc::now();
        let tx = self.immediate()?;
        tx.execute(
            INSERT_RESERVATION,
            params![
                fields.slot_id.value(),
                fields.date.format("%Y-%m-%d").to_string(),
                fields.turn.as_str(),
                fields.vehicle_type.as_str(),
                fields.requester_email,
                fields.requester_name,
                ReservationStatus::Active.as_str(),
                created_at.timestamp(),
            ],
        )?;
        let id = ReservationId::new(tx.last_insert_rowid());
        tx.commit().map_err(|e| self.map_busy(e))?;
        // Match the second precision of the stored timestamp
        let created_at = DateTime::from_timestamp(created_at.timestamp(), 0).unwrap_or(created_at);
        Ok(fields.into_reservation(id, created_at))
    }

    fn update(&self, id: ReservationId, patch: ReservationPatch) -> Result<Reservation> {
        let tx = self.immediate()?;
        let mut reservation = tx
            .query_row(
                &format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?"),
                [id.value()],
                row_to_reservation,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => not_found::<Reservation>(id),
                other => Error::Database(other),
            })?;
        patch.apply(&mut reservation);
        tx.execute(
            UPDATE_RESERVATION_STATUS,
            params![reservation.status.as_str(), id.value()],
        )?;
        tx.commit().map_err(|e| self.map_busy(e))?;
        Ok(reservation)
    }

    fn delete(&self, id: ReservationId) -> Result<()> {
        if self.delete_by_id("reservations", id.value())? {
            Ok(())
        } else {
            Err(not_found::<Reservation>(id))
        }
    }
}

impl ListStore<Settings> for Database {
    fn get_all(&self, query: &Query) -> Result<Vec<Settings>> {
        self.select(
            "settings",
            SETTINGS_COLUMNS,
            settings_column,
            query,
            row_to_settings,
        )
    }

    fn create(&self, fields: NewSettings) -> Result<Settings> {
        let bounds = fields.turn_bounds;
        let tx = self.immediate()?;
        tx.execute(
            INSERT_SETTINGS,
            params![
                fields.visible_days,
                bounds.morning_start,
                bounds.morning_end,
                bounds.afternoon_start,
                bounds.afternoon_end
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit().map_err(|e| self.map_busy(e))?;
        Ok(Settings {
            id,
            visible_days: fields.visible_days,
            turn_bounds: bounds,
        })
    }

    fn update(&self, id: i64, patch: SettingsPatch) -> Result<Settings> {
        let tx = self.immediate()?;
        let mut settings = tx
            .query_row(
                &format!("SELECT {SETTINGS_COLUMNS} FROM settings WHERE id = ?"),
                [id],
                row_to_settings,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => not_found::<Settings>(id),
                other => Error::Database(other),
            })?;
        patch.apply(&mut settings);
        let bounds = settings.turn_bounds;
        tx.execute(
            UPDATE_SETTINGS,
            params![
                settings.visible_days,
                bounds.morning_start,
                bounds.morning_end,
                bounds.afternoon_start,
                bounds.afternoon_end,
                id
            ],
        )?;
        tx.commit().map_err(|e| self.map_busy(e))?;
        Ok(settings)
    }

    fn delete(&self, id: i64) -> Result<()> {
        if self.delete_by_id("settings", id)? {
            Ok(())
        } else {
            Err(not_found::<Settings>(id))
        }
    }
}
