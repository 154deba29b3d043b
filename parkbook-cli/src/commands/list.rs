//! List command implementation.
//!
//! This module implements the `list` command, which displays reservations
//! in various formats (table, JSON, CSV, TSV).

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, output_format, write_records, GlobalOptions};
use chrono::NaiveDate;
use clap::Args;
use parkbook::config::OutputFormat;
use parkbook::reservation::store::{ReservationFilter, ReservationStore};
use parkbook::slot::catalog::SlotCatalog;
use parkbook::{Reservation, SlotId, Turn};
use std::collections::HashMap;

/// Column headers for CSV/TSV output.
const COLUMN_HEADERS: [&str; 8] = [
    "id",
    "date",
    "turn",
    "slot",
    "vehicle_type",
    "requester_email",
    "requester_name",
    "status",
];

/// List reservations.
#[derive(Args)]
pub struct ListCommand {
    /// Output format
    #[arg(long, value_enum, ignore_case = true)]
    pub format: Option<OutputFormat>,

    /// Only this day (shorthand for --from DATE --to DATE)
    #[arg(long, value_name = "DATE", conflicts_with_all = ["from", "to"])]
    pub date: Option<NaiveDate>,

    /// Earliest day, inclusive
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Latest day, inclusive
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Filter by slot code
    #[arg(long, value_name = "CODE")]
    pub slot: Option<String>,

    /// Filter by requester e-mail
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Filter by turn held
    #[arg(long, value_enum, ignore_case = true)]
    pub turn: Option<Turn>,

    /// Include cancelled reservations
    #[arg(long)]
    pub include_cancelled: bool,
}

impl ListCommand {
    /// Execute the list command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;
        let catalog = SlotCatalog::new(&db);

        let slot_id = match &self.slot {
            Some(code) => Some(catalog.get_by_code(code)?.id),
            None => None,
        };

        let reservations = ReservationStore::new(&db).list(&ReservationFilter {
            from: self.date.or(self.from),
            to: self.date.or(self.to),
            slot_id,
            requester_email: self.email,
            turn: self.turn,
            include_cancelled: self.include_cancelled,
        })?;

        let codes: HashMap<SlotId, String> = catalog
            .list_all()?
            .into_iter()
            .map(|slot| (slot.id, slot.code))
            .collect();
        let rows: Vec<Vec<String>> = reservations
            .iter()
            .map(|r| reservation_row(r, &codes))
            .collect();

        write_records(
            output_format(self.format, &config),
            &COLUMN_HEADERS,
            &rows,
            &reservations,
        )
    }
}

fn reservation_row(reservation: &Reservation, codes: &HashMap<SlotId, String>) -> Vec<String> {
    vec![
        reservation.id.to_string(),
        reservation.date.to_string(),
        reservation.turn.to_string(),
        codes
            .get(&reservation.slot_id)
            .cloned()
            .unwrap_or_else(|| reservation.slot_id.to_string()),
        reservation.vehicle_type.to_string(),
        reservation.requester_email.clone(),
        reservation.requester_name.clone(),
        reservation.status.to_string(),
    ]
}
