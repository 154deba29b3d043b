//! Diagnostic output for parkbook.
//!
//! The engine reports through the `log` facade (`log::debug!` for each
//! candidate slot it walks, `log::warn!` for compensations and verify
//! failures). [`Logger`] is the stderr backend the command line installs;
//! library users are free to install any other `log` implementation.

use std::env;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Environment variable consulted by [`init_logger`] when no flag is given.
pub const LOG_MODE_ENV: &str = "PARKBOOK_LOG_MODE";

/// How much the backend lets through.
///
/// ```
/// use parkbook::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert_eq!("Verbose".parse::<LogLevel>().unwrap(), LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Nothing at all.
    Quiet,
    /// Errors and warnings.
    #[default]
    Normal,
    /// Everything down to debug, including the allocation walk.
    Verbose,
}

impl LogLevel {
    const ALL: [Self; 3] = [Self::Quiet, Self::Normal, Self::Verbose];

    const fn name(self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Normal => "normal",
            Self::Verbose => "verbose",
        }
    }

    /// The most detailed `log` level that passes this filter.
    #[must_use]
    pub const fn level_filter(self) -> log::LevelFilter {
        match self {
            Self::Quiet => log::LevelFilter::Off,
            Self::Normal => log::LevelFilter::Warn,
            Self::Verbose => log::LevelFilter::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown log mode '{s}' (expected quiet, normal or verbose)"))
    }
}

/// Stderr backend for the `log` facade.
///
/// Lines look like `parkbook: warning: <message>`; at verbose level the
/// emitting module is appended so the allocation walk can be followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// Creates a backend filtering at `level`.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// The filter this backend applies.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    fn render(&self, record: &log::Record<'_>) -> String {
        let tag = match record.level() {
            log::Level::Error => "error",
            log::Level::Warn => "warning",
            log::Level::Info => "info",
            log::Level::Debug | log::Level::Trace => "debug",
        };
        if self.level == LogLevel::Verbose {
            format!("parkbook: {tag}: {} [{}]", record.args(), record.target())
        } else {
            format!("parkbook: {tag}: {}", record.args())
        }
    }

    /// Installs this backend process-wide.
    ///
    /// Returns false when another backend was installed first; that one is
    /// left in place.
    pub fn install(self) -> bool {
        let filter = self.level.level_filter();
        match log::set_boxed_logger(Box::new(self)) {
            Ok(()) => {
                log::set_max_level(filter);
                true
            }
            Err(_) => false,
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.level.level_filter()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            let line = self.render(record);
            let _ = writeln!(std::io::stderr().lock(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Picks the backend level from the command-line switches, falling back to
/// `PARKBOOK_LOG_MODE` and then to [`LogLevel::Normal`].
///
/// `verbose` wins over `quiet`. An unparsable environment value is ignored.
///
/// ```
/// use parkbook::{init_logger, LogLevel};
///
/// assert_eq!(init_logger(false, true).level(), LogLevel::Quiet);
/// ```
#[must_use]
pub fn init_logger(verbose: bool, quiet: bool) -> Logger {
    let level = if verbose {
        LogLevel::Verbose
    } else if quiet {
        LogLevel::Quiet
    } else {
        env::var(LOG_MODE_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    };
    Logger::new(level)
}
