use std::{fmt, str::FromStr};

use colored::{ColoredString, Colorize};

/// Importance of a log call. Ordered by its raw ordinal, `DEBUG < INFO < ERROR`.
///
/// Any other ordinal is still a valid threshold and renders as `???`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Severity(u8);

impl Severity {
    pub const DEBUG: Severity = Severity(1);
    pub const INFO: Severity = Severity(2);
    pub const ERROR: Severity = Severity(3);

    pub const fn from_ordinal(ordinal: u8) -> Self {
        Self(ordinal)
    }

    pub const fn ordinal(self) -> u8 {
        self.0
    }

    /// Label used in the line header.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DEBUG => "DEBUG",
            Self::INFO => "INFO",
            Self::ERROR => "ERROR",
            _ => "???",
        }
    }

    pub(crate) fn colored(self) -> ColoredString {
        match self {
            Self::DEBUG => self.as_str().blue(),
            Self::INFO => self.as_str().green(),
            Self::ERROR => self.as_str().red(),
            _ => self.as_str().normal(),
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::DEBUG
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::DEBUG),
            "info" => Ok(Self::INFO),
            "error" => Ok(Self::ERROR),
            other => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("unknown severity {other:?}, expected debug, info or error"),
            )),
        }
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace | log::Level::Debug => Self::DEBUG,
            log::Level::Info => Self::INFO,
            log::Level::Warn | log::Level::Error => Self::ERROR,
        }
    }
}
