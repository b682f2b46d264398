use std::fmt;

use colored::{ColoredString, Colorize};
use log::Level;

/// Severity of a log call, ordered from the most to the least severe.
///
/// The configured level is a verbosity ceiling: a threshold lets through every
/// severity whose rank is lower than or equal to its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Fatal = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Fatal,
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Debug,
    ];

    pub fn rank(self) -> i64 {
        self as i64
    }

    pub fn from_rank(rank: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|severity| severity.rank() == rank)
    }

    pub fn name(self) -> &'static str {
        match self {
            Severity::Fatal => "FATAL",
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /// Returns true when a call at `requested` passes this threshold.
    pub fn permits(self, requested: Severity) -> bool {
        self.rank() >= requested.rank()
    }

    pub fn colored_name(self) -> ColoredString {
        match self {
            Severity::Fatal => self.name().magenta().bold(),
            Severity::Error => self.name().red(),
            Severity::Warn => self.name().yellow(),
            Severity::Info => self.name().green(),
            Severity::Debug => self.name().blue(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => Severity::Error,
            Level::Warn => Severity::Warn,
            Level::Info => Severity::Info,
            Level::Debug | Level::Trace => Severity::Debug,
        }
    }
}
