//! Occupancy command: per-slot and per-vehicle usage for a day.

use crate::error::CliError;
use crate::utils::{
    load_configuration, now, open_database, output_format, today, write_records, GlobalOptions,
};
use chrono::{NaiveDate, NaiveTime};
use clap::Args;
use parkbook::config::OutputFormat;
use parkbook::{OccupancyAggregator, OccupancySnapshot, VehicleType};

/// Column headers for the per-slot listing.
const COLUMN_HEADERS: [&str; 7] = [
    "slot",
    "vehicle_type",
    "mode",
    "morning",
    "afternoon",
    "occupied_now",
    "occupant",
];

/// Show slot occupancy.
#[derive(Args)]
pub struct OccupancyCommand {
    /// Day to inspect (defaults to today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Time of day deciding the current turn, as HH:MM (defaults to now)
    #[arg(long, value_name = "HH:MM", value_parser = parse_time)]
    pub time: Option<NaiveTime>,

    /// Output format
    #[arg(long, value_enum, ignore_case = true)]
    pub format: Option<OutputFormat>,
}

impl OccupancyCommand {
    /// Execute the occupancy command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;

        let aggregator = OccupancyAggregator::new(&db, config.capacities(), config.turn_bounds());
        let snapshot = aggregator.snapshot(
            self.date.unwrap_or_else(today),
            self.time.unwrap_or_else(now),
        )?;

        let format = output_format(self.format, &config);
        let rows = slot_rows(&snapshot);
        write_records(format, &COLUMN_HEADERS, &rows, &snapshot)?;

        if format == OutputFormat::Table && !global.quiet {
            println!();
            for vehicle_type in [VehicleType::Car, VehicleType::Motorcycle] {
                let totals = snapshot.by_vehicle[&vehicle_type];
                println!(
                    "{vehicle_type}: {} of {} place(s) in use, {} free, {} slot(s) occupied",
                    totals.used_now, totals.capacity, totals.free_now, totals.occupied_slots_now
                );
            }
        }

        Ok(())
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

fn slot_rows(snapshot: &OccupancySnapshot) -> Vec<Vec<String>> {
    let mut slots: Vec<_> = snapshot.per_slot.values().collect();
    slots.sort_by(|a, b| a.code.cmp(&b.code));
    slots
        .into_iter()
        .map(|slot| {
            vec![
                slot.code.clone(),
                slot.vehicle_type.to_string(),
                slot.assignment_mode.to_string(),
                format!("{}/{}", slot.morning_count, slot.capacity),
                format!("{}/{}", slot.afternoon_count, slot.capacity),
                slot.occupied_now(snapshot.current_turn).to_string(),
                slot.occupant_name.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect()
}
