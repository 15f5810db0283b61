use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log event as seen by the host logging facility.
///
/// Variants are declared from most to least severe, so `Level::Panic` is the
/// smallest value under `Ord` and carries the raw number `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Panic,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Level {
    /// Every level, most severe first.
    pub const ALL: [Level; 7] = [
        Level::Panic,
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    /// Google Cloud severity for this level.
    pub fn severity(self) -> Severity {
        match self {
            Level::Panic => Severity::Emergency,
            Level::Fatal => Severity::Alert,
            Level::Error => Severity::Error,
            Level::Warn => Severity::Warning,
            Level::Info => Severity::Info,
            Level::Debug => Severity::Debug,
            Level::Trace => Severity::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Panic => "panic",
            Level::Fatal => "fatal",
            Level::Error => "error",
            Level::Warn => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::INFO => Level::Info,
            tracing::Level::DEBUG => Level::Debug,
            _ => Level::Trace,
        }
    }
}

impl TryFrom<u32> for Level {
    type Error = LevelParseError;

    fn try_from(raw: u32) -> Result<Self, LevelParseError> {
        Level::ALL
            .get(raw as usize)
            .copied()
            .ok_or(LevelParseError::OutOfRange(raw))
    }
}

impl FromStr for Level {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "panic" => Ok(Level::Panic),
            "fatal" => Ok(Level::Fatal),
            "error" => Ok(Level::Error),
            "warn" | "warning" => Ok(Level::Warn),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            "trace" => Ok(Level::Trace),
            _ => Err(LevelParseError::UnknownName(s.to_string())),
        }
    }
}

/// Error returned when a level cannot be built from a name or number.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LevelParseError {
    #[error("unknown log level name {0:?}")]
    UnknownName(String),
    #[error("log level {0} is out of range")]
    OutOfRange(u32),
}

/// Severity vocabulary understood by Google Cloud Logging.
///
/// See <https://cloud.google.com/logging/docs/reference/v2/rest/v2/LogEntry#logseverity>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Default,
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Severity {
    /// Severity for a raw numeric level. Numbers outside the known range
    /// fall back to [`Severity::Default`].
    pub fn from_raw_level(raw: u32) -> Severity {
        match Level::try_from(raw) {
            Ok(level) => level.severity(),
            Err(_) => Severity::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Default => "Default",
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Notice => "Notice",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
            Severity::Alert => "Alert",
            Severity::Emergency => "Emergency",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
