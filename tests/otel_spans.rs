use opentelemetry::trace::TracerProvider as _;
use serde_json::Value;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::{info, info_span};
use tracing_gcloud_format::{Formatter, StructuredLogLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(f: impl FnOnce()) -> Vec<Value> {
    let provider = opentelemetry_sdk::trace::TracerProvider::builder().build();
    let tracer = provider.tracer("otel-spans-test");

    let buf = SharedBuffer::default();
    let writer = buf.clone();
    let subscriber = Registry::default()
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .with(StructuredLogLayer::new(Formatter::new()).with_writer(move || writer.clone()));

    tracing::subscriber::with_default(subscriber, f);

    let bytes = buf.0.lock().unwrap().clone();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn is_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

#[test]
fn events_inside_spans_carry_trace_ids() {
    let lines = capture(|| {
        info!("before any span");
        let request = info_span!("request");
        let _request = request.enter();
        info!("in request");
        {
            let query = info_span!("query");
            let _query = query.enter();
            info!("in query");
        }
    });

    assert_eq!(lines.len(), 3);

    assert!(lines[0].get("logging.googleapis.com/trace").is_none());
    assert!(lines[0].get("logging.googleapis.com/spanId").is_none());

    let trace = lines[1]["logging.googleapis.com/trace"].as_str().unwrap();
    let request_span = lines[1]["logging.googleapis.com/spanId"].as_str().unwrap();
    assert!(is_hex(trace, 32), "{trace}");
    assert!(is_hex(request_span, 16), "{request_span}");

    assert_eq!(lines[2]["logging.googleapis.com/trace"], trace);
    let query_span = lines[2]["logging.googleapis.com/spanId"].as_str().unwrap();
    assert!(is_hex(query_span, 16), "{query_span}");
    assert_ne!(query_span, request_span);
}

#[test]
fn separate_root_spans_get_separate_traces() {
    let lines = capture(|| {
        info_span!("first").in_scope(|| info!("one"));
        info_span!("second").in_scope(|| info!("two"));
    });

    assert_eq!(lines.len(), 2);
    assert_ne!(
        lines[0]["logging.googleapis.com/trace"],
        lines[1]["logging.googleapis.com/trace"]
    );
}
