use std::collections::BTreeMap;
use tracing::{error, info, info_span, warn};
use tracing_gcloud_format::init::{init_tracing_with_config, LayerConfig};

/// Writes a handful of events to stdout as Cloud Logging JSON lines.
///
/// Run with `LOG_LABELS` unset to see the explicit labels below, e.g.
/// `cargo run --example stdout | jq .`
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LayerConfig {
        labels: BTreeMap::from([
            ("service".to_string(), "checkout".to_string()),
            ("env".to_string(), "dev".to_string()),
        ]),
        report_caller: true,
    };
    init_tracing_with_config(config)?;

    info!("starting service");

    let span = info_span!("request", path = "/cart");
    let _guard = span.enter();

    warn!(latency_ms = 950, "slow upstream");
    error!(
        user_id = 42,
        reason = "card declined",
        "payment failed"
    );

    Ok(())
}
