//! Assign command: book a named slot for a requester.

use crate::commands::reserve::{print_allocation, RequestArgs};
use crate::error::CliError;
use crate::utils::{load_configuration, open_database, output_format, GlobalOptions};
use clap::Args;
use parkbook::config::OutputFormat;
use parkbook::slot::catalog::SlotCatalog;
use parkbook::{AllocationEngine, AllocationPolicy};

/// Book a specific slot, bypassing the booking window.
#[derive(Args)]
pub struct AssignCommand {
    /// Code of the slot to book
    #[arg(long, value_name = "CODE")]
    pub slot: String,

    #[command(flatten)]
    pub request: RequestArgs,

    /// Output format (json prints the created rows)
    #[arg(long, value_enum, ignore_case = true)]
    pub format: Option<OutputFormat>,
}

impl AssignCommand {
    /// Execute the assign command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;

        let slot = SlotCatalog::new(&db).get_by_code(&self.slot)?;
        let request = self.request.request(slot.vehicle_type, &db, &config)?;
        let engine = AllocationEngine::new(&db, AllocationPolicy::from_config(&config));
        let allocation = engine.assign(slot.id, &request)?;

        print_allocation(&allocation, output_format(self.format, &config), global)
    }
}
