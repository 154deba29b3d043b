//! CLI command implementations.
//!
//! - `init`: Create the data directory, database and settings record
//! - `slot`: Manage parking slots
//! - `settings`: Show or change the booking window and turn bounds
//! - `window`: Show the dates open for booking
//! - `reserve`: Book the first free slot
//! - `assign`: Book a named slot
//! - `cancel`: Cancel reservations
//! - `list`: List reservations
//! - `occupancy`: Show slot usage for a day
//! - `completions`: Generate shell completion scripts

pub mod assign;
pub mod cancel;
pub mod completions;
pub mod init;
pub mod list;
pub mod occupancy;
pub mod reserve;
pub mod settings;
pub mod slot;
pub mod window;

pub use assign::AssignCommand;
pub use cancel::CancelCommand;
pub use completions::CompletionsCommand;
pub use init::InitCommand;
pub use list::ListCommand;
pub use occupancy::OccupancyCommand;
pub use reserve::ReserveCommand;
pub use settings::SettingsCommand;
pub use slot::SlotCommand;
pub use window::WindowCommand;
