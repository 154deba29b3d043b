//! Errors as the command line reports them, each with its exit status.
//!
//! | status | meaning |
//! |-------:|---------|
//! | 1 | booking refused (already booked, full, no slots, outside window) |
//! | 2 | gave up waiting for the database lock |
//! | 3 | no database and auto-init is off |
//! | 4 | bad arguments or invalid values |
//! | 5 | I/O failure |
//! | 6 | any other library failure |
//! | 7 | unreadable or invalid configuration |

use parkbook::Error as LibError;
use thiserror::Error;

/// Failure of a `parkbook` invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// Anything the library reports that has no dedicated variant here.
    #[error("{}", .0.user_message())]
    Library(#[source] LibError),

    /// Arguments that parse but make no sense together.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Reading or writing files or stdout failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Another writer held the database longer than the busy timeout.
    #[error("Timed out after {seconds}s waiting for the database lock")]
    Timeout {
        /// The busy timeout that elapsed.
        seconds: u64,
    },

    /// The database file is missing and may not be created.
    #[error("No parkbook database found (run `parkbook init` or drop --disable-autoinit)")]
    NoDataDirectory,

    /// The configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Library(err) if err.is_refusal() => 1,
            Self::Timeout { .. } => 2,
            Self::NoDataDirectory => 3,
            Self::InvalidArguments(_) | Self::Library(LibError::Validation { .. }) => 4,
            Self::Io(_) => 5,
            Self::Library(_) => 6,
            Self::Config(_) => 7,
        }
    }
}

impl From<LibError> for CliError {
    fn from(err: LibError) -> Self {
        match err {
            LibError::LockTimeout { seconds } => Self::Timeout { seconds },
            LibError::DataDirectoryNotFound { .. } => Self::NoDataDirectory,
            LibError::Io(io) => Self::Io(io),
            other => Self::Library(other),
        }
    }
}
