//! # Quayside Telemetry
//!
//! Diagnostic logging setup, structured run events and prometheus metrics.
//! The simulated event log (`<time>: <message>`) is not telemetry; it goes
//! through `quayside_core::trace` sinks.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
