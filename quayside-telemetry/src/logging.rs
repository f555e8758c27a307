//! ## quayside-telemetry::logging
//! **Structured logging with tracing and OpenTelemetry attributes**
//!
//! `init` installs the global subscriber once per process. Run-level
//! milestones (run finished, digest mismatch, sweep completed) go through
//! `log_event` so they share one span name and carry `KeyValue` metadata.

use opentelemetry::KeyValue;
use tracing::info_span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. `RUST_LOG` overrides `default_filter`.
    /// Diagnostics go to stderr so stdout stays free for the event log.
    ///
    /// Returns `false` if a subscriber was already installed.
    pub fn init(default_filter: &str, json: bool) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        let builder = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE);
        if json {
            builder.json().try_init().is_ok()
        } else {
            builder.try_init().is_ok()
        }
    }

    pub fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!("run_event", event_type = event_type, otel.kind = "INTERNAL");
        span.in_scope(|| {
            tracing::info!(metadata = ?metadata, "Run event recorded");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn run_events_are_logged_with_metadata() {
        EventLogger::log_event(
            "run_finished",
            vec![KeyValue::new("seed", 42i64), KeyValue::new("stop_reason", "horizon_reached")],
        );
        assert!(logs_contain("Run event recorded"));
        assert!(logs_contain("horizon_reached"));
    }
}
