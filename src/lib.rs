pub mod level;
pub mod record;
pub mod formatter;
pub mod layer;

pub mod env;
pub mod init;

pub use formatter::{FormatError, Formatter, WriteError};
pub use layer::StructuredLogLayer;
pub use level::{Level, LevelParseError, Severity};
pub use record::{Caller, LogEntry, LogEvent};
