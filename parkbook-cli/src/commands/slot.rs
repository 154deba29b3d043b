//! Slot administration commands.
//!
//! `slot add|list|edit|activate|deactivate|remove` manage the physical pool.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, output_format, write_records, GlobalOptions};
use clap::{Args, Subcommand};
use parkbook::config::OutputFormat;
use parkbook::slot::catalog::{SlotCatalog, SlotFilter};
use parkbook::{AssignmentMode, NewSlot, Slot, SlotPatch, VehicleType};

/// Column headers for slot listings.
const COLUMN_HEADERS: [&str; 5] = ["id", "code", "vehicle_type", "assignment_mode", "active"];

/// Manage parking slots.
#[derive(Args)]
pub struct SlotCommand {
    #[command(subcommand)]
    pub action: SlotAction,
}

/// Slot subcommands.
#[derive(Subcommand)]
pub enum SlotAction {
    /// Add a slot
    Add {
        /// Display code, unique across slots (e.g. A-01)
        code: String,

        /// Vehicle type the slot is built for
        #[arg(long = "vehicle", value_enum, ignore_case = true)]
        vehicle_type: VehicleType,

        /// How the slot is handed out
        #[arg(long = "mode", value_enum, default_value = "itinerant")]
        assignment_mode: AssignmentMode,

        /// Create the slot inactive
        #[arg(long)]
        inactive: bool,
    },

    /// List slots
    List {
        /// Only slots for this vehicle type
        #[arg(long = "vehicle", value_enum, ignore_case = true)]
        vehicle_type: Option<VehicleType>,

        /// Only slots with this assignment mode
        #[arg(long = "mode", value_enum)]
        assignment_mode: Option<AssignmentMode>,

        /// Skip inactive slots
        #[arg(long)]
        active_only: bool,

        /// Only codes containing this text
        #[arg(long, value_name = "TEXT")]
        code_contains: Option<String>,

        /// Output format
        #[arg(long, value_enum, ignore_case = true)]
        format: Option<OutputFormat>,
    },

    /// Change a slot's code, vehicle type or assignment mode
    Edit {
        /// Current code of the slot
        code: String,

        /// New code
        #[arg(long = "code", value_name = "CODE")]
        new_code: Option<String>,

        /// New vehicle type
        #[arg(long = "vehicle", value_enum, ignore_case = true)]
        vehicle_type: Option<VehicleType>,

        /// New assignment mode
        #[arg(long = "mode", value_enum)]
        assignment_mode: Option<AssignmentMode>,
    },

    /// Make a slot bookable again
    Activate {
        /// Code of the slot
        code: String,
    },

    /// Withdraw a slot from booking without deleting it
    Deactivate {
        /// Code of the slot
        code: String,
    },

    /// Delete a slot and every reservation on it
    Remove {
        /// Code of the slot
        code: String,
    },
}

impl SlotCommand {
    /// Execute the slot command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;
        let catalog = SlotCatalog::new(&db);

        match self.action {
            SlotAction::Add {
                code,
                vehicle_type,
                assignment_mode,
                inactive,
            } => {
                let mut slot = NewSlot::new(&code, vehicle_type, assignment_mode)
                    .map_err(parkbook::Error::from)?;
                slot.active = !inactive;
                let slot = catalog.add(slot)?;
                if !global.quiet {
                    println!("Added slot {} ({}, {})", slot.code, slot.vehicle_type, slot.assignment_mode);
                }
            }
            SlotAction::List {
                vehicle_type,
                assignment_mode,
                active_only,
                code_contains,
                format,
            } => {
                let slots = catalog.list(&SlotFilter {
                    vehicle_type,
                    assignment_mode,
                    active_only,
                    code_contains,
                })?;
                let rows: Vec<Vec<String>> = slots.iter().map(slot_row).collect();
                write_records(output_format(format, &config), &COLUMN_HEADERS, &rows, &slots)?;
            }
            SlotAction::Edit {
                code,
                new_code,
                vehicle_type,
                assignment_mode,
            } => {
                let patch = SlotPatch {
                    code: new_code,
                    vehicle_type,
                    active: None,
                    assignment_mode,
                };
                if patch.is_empty() {
                    return Err(CliError::InvalidArguments(
                        "nothing to change (use --code, --vehicle or --mode)".to_string(),
                    ));
                }
                let slot = catalog.get_by_code(&code)?;
                let slot = catalog.update(slot.id, patch)?;
                if !global.quiet {
                    println!("Updated slot {}", slot.code);
                }
            }
            SlotAction::Activate { code } => {
                let slot = catalog.get_by_code(&code)?;
                catalog.set_active(slot.id, true)?;
                if !global.quiet {
                    println!("Activated slot {code}");
                }
            }
            SlotAction::Deactivate { code } => {
                let slot = catalog.get_by_code(&code)?;
                catalog.set_active(slot.id, false)?;
                if !global.quiet {
                    println!("Deactivated slot {code}");
                }
            }
            SlotAction::Remove { code } => {
                let slot = catalog.get_by_code(&code)?;
                let removed = catalog.remove(slot.id)?;
                if !global.quiet {
                    println!("Removed slot {code} and {removed} reservation(s)");
                }
            }
        }

        Ok(())
    }
}

fn slot_row(slot: &Slot) -> Vec<String> {
    vec![
        slot.id.to_string(),
        slot.code.clone(),
        slot.vehicle_type.to_string(),
        slot.assignment_mode.to_string(),
        slot.active.to_string(),
    ]
}
