use crate::formatter::Formatter;
use crate::level::Level;
use crate::record::{Caller, LogEvent};
use opentelemetry::trace::{SpanContext, TraceContextExt, TraceFlags, TraceState};
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_opentelemetry::OtelData;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that renders every event with a
/// [`Formatter`] and writes the resulting JSON line to a [`MakeWriter`].
///
/// Writing happens synchronously on the thread that emitted the event;
/// there is no buffering. When an `OpenTelemetryLayer` is part of the same
/// subscriber, the ids of the event's span end up in the trace fields.
pub struct StructuredLogLayer<W = fn() -> io::Stdout> {
    formatter: Formatter,
    make_writer: W,
    report_caller: bool,
    /// Total events seen by the layer.
    pub total_events: Arc<AtomicU64>,
    /// Events written to the writer.
    pub written_events: Arc<AtomicU64>,
    /// Events lost because formatting or writing failed.
    pub failed_events: Arc<AtomicU64>,
}

impl StructuredLogLayer {
    /// Create a layer that writes to stdout.
    pub fn new(formatter: Formatter) -> Self {
        StructuredLogLayer {
            formatter,
            make_writer: io::stdout,
            report_caller: false,
            total_events: Arc::new(AtomicU64::new(0)),
            written_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<W> StructuredLogLayer<W> {
    /// Send output to `make_writer` instead.
    pub fn with_writer<W2>(self, make_writer: W2) -> StructuredLogLayer<W2>
    where
        W2: for<'a> MakeWriter<'a> + 'static,
    {
        StructuredLogLayer {
            formatter: self.formatter,
            make_writer,
            report_caller: self.report_caller,
            total_events: self.total_events,
            written_events: self.written_events,
            failed_events: self.failed_events,
        }
    }

    /// Attach the call site of each event. Error events then carry an
    /// `exception` entry pointing at it.
    pub fn with_caller(mut self, report_caller: bool) -> Self {
        self.report_caller = report_caller;
        self
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }
}

impl<S, W> Layer<S> for StructuredLogLayer<W>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'a> MakeWriter<'a> + 'static,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let mut fields = Map::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let meta = event.metadata();
        let mut record = LogEvent::new(Level::from(*meta.level()), message.unwrap_or_default())
            .with_fields(fields);
        record.context = span_context(event, &ctx);

        if self.report_caller {
            record.caller = Some(Caller::new(
                meta.module_path().unwrap_or_else(|| meta.target()),
                meta.file().unwrap_or("<unknown>"),
                meta.line().unwrap_or(0),
            ));
        }

        // Errors go to stderr: logging them through tracing would recurse.
        let line = match self.formatter.format(&record) {
            Ok(line) => line,
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("failed to format log event: {}", e);
                return;
            }
        };

        let mut writer = self.make_writer.make_writer_for(meta);
        match writer.write_all(&line) {
            Ok(()) => {
                self.written_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("failed to write log line: {}", e);
            }
        }
    }
}

/// OpenTelemetry context for the span `event` belongs to.
///
/// Root spans carry their trace id in the span builder, child spans inherit
/// it from the parent context recorded by `tracing-opentelemetry`.
fn span_context<S>(event: &Event<'_>, ctx: &Context<'_, S>) -> Option<opentelemetry::Context>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let span = ctx.event_span(event)?;
    let extensions = span.extensions();
    let otel = extensions.get::<OtelData>()?;

    let span_id = otel.builder.span_id?;
    let trace_id = match otel.builder.trace_id {
        Some(trace_id) => trace_id,
        None => {
            let parent = otel.parent_cx.span();
            let parent_context = parent.span_context();
            if !parent_context.is_valid() {
                return None;
            }
            parent_context.trace_id()
        }
    };

    Some(opentelemetry::Context::new().with_remote_span_context(SpanContext::new(
        trace_id,
        span_id,
        TraceFlags::default(),
        false,
        TraceState::default(),
    )))
}

/// Collects event fields into a JSON map, pulling out `message`.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Map<String, Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> FieldVisitor<'a> {
    /// Store `value` as a field, or as the message when the field is named
    /// `message`. Non-string messages keep their JSON text, e.g. `42`.
    fn record_value(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            *self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record_value(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `info!("text")` arrives here as `fmt::Arguments`.
        self.record_value(field, Value::String(format!("{:?}", value)));
    }
}
