//! # Quayside Configuration System
//!
//! Hierarchical configuration for terminal simulation runs. Every parameter
//! that shapes a run lives here so a saved configuration plus a seed fully
//! determines the event log.
//!
//! ## Sections
//! - `simulation`: horizon and seed
//! - `terminal`: berths, quay cranes, trucks
//! - `arrivals`: vessel count, mean inter-arrival time, containers per vessel
//! - `handling`: crane/truck service times, crane pool policy, truck toggle
//! - `telemetry`: log filter, JSON output, event echo

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod arrivals;
mod error;
mod handling;
mod simulation;
mod telemetry;
mod terminal;
mod validation;

pub use arrivals::ArrivalConfig;
pub use error::ConfigError;
pub use handling::{CranePoolPolicy, HandlingConfig};
pub use simulation::SimulationConfig;
pub use telemetry::TelemetryConfig;
pub use terminal::TerminalConfig;

const BASE_FILE: &str = "config/quayside.yaml";
const ENV_PREFIX: &str = "QUAYSIDE_";

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct QuaysideConfig {
    #[serde(default)]
    #[validate(nested)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    #[validate(nested)]
    pub terminal: TerminalConfig,

    #[serde(default)]
    #[validate(nested)]
    pub arrivals: ArrivalConfig,

    #[serde(default)]
    #[validate(nested)]
    pub handling: HandlingConfig,

    #[serde(default)]
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl QuaysideConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/quayside.yaml`, if present
    /// 3. `config/<QUAYSIDE_ENV>.yaml`, if present (`QUAYSIDE_ENV` defaults to `local`)
    /// 4. `QUAYSIDE_*` environment variables, `__` separating sections
    ///    (`QUAYSIDE_TERMINAL__BERTHS=3`)
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(QuaysideConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        }

        let env = std::env::var("QUAYSIDE_ENV").unwrap_or_else(|_| "local".into());
        let env_file = format!("config/{env}.yaml");
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::finish(figment)
    }

    /// Load a single YAML file over the defaults, then environment overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment = Figment::from(Serialized::defaults(QuaysideConfig::default()))
            .merge(Yaml::file(path));
        Self::finish(figment)
    }

    /// Parse YAML text over the defaults. No environment overrides.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Figment::from(Serialized::defaults(QuaysideConfig::default()))
            .merge(Yaml::string(text))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
