use crate::formatter::FormatError;
use crate::level::{Level, Severity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single event handed to the [`Formatter`](crate::formatter::Formatter)
/// by the logging facility.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
    pub fields: Map<String, Value>,
    /// OpenTelemetry context holding the span that was active when the event
    /// was emitted, if any.
    pub context: Option<opentelemetry::Context>,
    /// Call site, only present when caller capture is enabled.
    pub caller: Option<Caller>,
}

impl LogEvent {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        LogEvent {
            level,
            message: message.into(),
            fields: Map::new(),
            context: None,
            caller: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn with_context(mut self, context: opentelemetry::Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Convert `value` to JSON and store it under `key`.
    ///
    /// **Returns**
    /// - `Err(FormatError::Serialization)` if the value has no JSON
    ///   representation, e.g. a map keyed by something other than strings.
    ///   The field set is left untouched in that case.
    pub fn insert_serialized<T>(&mut self, key: impl Into<String>, value: &T) -> Result<(), FormatError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        self.fields.insert(key.into(), value);
        Ok(())
    }
}

/// Location of the code that emitted an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl Caller {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Caller {
            function: function.into(),
            file: file.into(),
            line,
        }
    }
}

/// Subset of the Google Cloud "structured logging" record written to stdout.
///
/// See <https://cloud.google.com/logging/docs/structured-logging>.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(
        rename = "logging.googleapis.com/trace",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub trace: String,
    #[serde(
        rename = "logging.googleapis.com/spanId",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub span_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(rename = "jsonPayload")]
    pub json_payload: Map<String, Value>,
}
