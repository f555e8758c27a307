//! Recorded scenarios: a configuration plus the digest it is expected to
//! reproduce. Saved as YAML so they can be checked into a repository.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

use quayside_config::{ConfigError, QuaysideConfig};

use crate::error::ScenarioError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub config: QuaysideConfig,
    /// Digest of the event log the scenario produced when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_digest: Option<String>,
}

impl Scenario {
    pub fn new(config: QuaysideConfig, expected_digest: Option<String>) -> Self {
        Self {
            config,
            expected_digest,
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScenarioError> {
        let path = path.as_ref();
        let text = serde_yaml::to_string(self)?;
        fs::write(path, text).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_yaml::from_str(text)?;
        scenario
            .config
            .validate()
            .map_err(ConfigError::from)?;
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let mut config = QuaysideConfig::default();
        config.simulation.seed = 99;
        let scenario = Scenario::new(config, Some("ab".repeat(32)));
        let path =
            std::env::temp_dir().join(format!("quayside-scenario-{}.yaml", std::process::id()));
        scenario.save(&path).unwrap();
        let loaded = Scenario::load(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(loaded, scenario);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = QuaysideConfig::default();
        config.terminal.berths = 0;
        let text = serde_yaml::to_string(&Scenario::new(config, None)).unwrap();
        assert!(matches!(
            Scenario::from_yaml(&text),
            Err(ScenarioError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = Scenario::load("no/such/scenario.yaml").unwrap_err();
        assert!(err.to_string().contains("no/such/scenario.yaml"));
    }
}
