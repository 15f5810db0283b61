use crate::level::{Level, Severity};
use crate::record::{LogEntry, LogEvent};
use opentelemetry::trace::TraceContextExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Turns [`LogEvent`]s into Google Cloud structured-logging JSON lines.
///
/// A formatter is built once, optionally given a set of static labels, and
/// then shared by every thread that logs. Formatting never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formatter {
    /// Labels attached to every record, e.g. service name or environment.
    pub labels: BTreeMap<String, String>,
}

impl Formatter {
    /// Create a formatter without any labels.
    pub fn new() -> Self {
        Formatter::default()
    }

    pub fn with_labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.labels
            .extend(labels.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Levels this formatter handles. The host facility registers the
    /// formatter against each of them.
    pub fn levels(&self) -> &'static [Level] {
        &Level::ALL
    }

    /// Build the structured record for `event` without serializing it.
    pub fn entry(&self, event: &LogEvent) -> LogEntry {
        let severity = event.level.severity();

        let mut entry = LogEntry {
            severity: Some(severity),
            labels: self.labels.clone(),
            json_payload: event.fields.clone(),
            ..LogEntry::default()
        };

        if let Some(cx) = &event.context {
            let span = cx.span();
            let span_context = span.span_context();
            if span_context.is_valid() {
                entry.trace = span_context.trace_id().to_string();
                entry.span_id = span_context.span_id().to_string();
            }
        }

        entry
            .json_payload
            .insert("message".to_string(), Value::String(event.message.clone()));

        if severity == Severity::Error {
            if let Some(caller) = &event.caller {
                entry.json_payload.insert(
                    "exception".to_string(),
                    Value::String(format!(
                        "{}\n\t{}:{}\n",
                        caller.function, caller.file, caller.line
                    )),
                );
            }
        }

        entry
    }

    /// Format `event` as a single newline-terminated JSON line.
    ///
    /// **Returns**
    /// - `Ok(bytes)` holding one JSON object followed by `\n`.
    /// - `Err(FormatError::Serialization)` if the payload could not be
    ///   encoded. Nothing is logged on failure; the caller decides.
    pub fn format(&self, event: &LogEvent) -> Result<Vec<u8>, FormatError> {
        let mut contents = serde_json::to_vec(&self.entry(event))?;
        contents.push(b'\n');
        Ok(contents)
    }

    /// Format `event` and write the line to `writer` in a single call.
    pub fn write_to<W>(&self, event: &LogEvent, writer: &mut W) -> Result<(), WriteError>
    where
        W: Write + ?Sized,
    {
        let line = self.format(event)?;
        writer.write_all(&line)?;
        Ok(())
    }
}

/// Error returned when an event cannot be turned into JSON.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("failed to serialize log entry: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error returned by [`Formatter::write_to`].
#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("failed to write log line: {0}")]
    Io(#[from] io::Error),
}
