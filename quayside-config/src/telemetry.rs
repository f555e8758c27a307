//! Observability configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct TelemetryConfig {
    /// Default `tracing` filter; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    #[validate(custom(function = validation::validate_log_level))]
    pub log_level: String,

    /// Emit diagnostics as JSON lines.
    #[serde(default)]
    pub json: bool,

    /// Print the `<time>: <message>` event log to stdout.
    #[serde(default = "default_true")]
    pub echo_events: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
            echo_events: true,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_true() -> bool {
    true
}
