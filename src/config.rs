//! Proxy configuration
//!
//! Loaded from YAML. Every field has a default, so an empty document is a
//! valid configuration.

use crate::proxy::Action;
use crate::reader::JsonReaderConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyConfig {
    /// Publish vetoable `BeforeLoad`/`BeforeWrite` before issuing requests.
    pub before_request_events: bool,
    /// Publish the deprecated `LoadException` duplicate for failed reads.
    /// Has no effect when the crate is built without `legacy-events`.
    pub legacy_load_exception: bool,
    /// Actions the handler registry must cover. Checked when the proxy is built.
    pub required_actions: Vec<Action>,
    /// Reader property names used by the bundled `JsonReader`.
    pub reader: JsonReaderConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            before_request_events: true,
            legacy_load_exception: true,
            required_actions: Vec::new(),
            reader: JsonReaderConfig::default(),
        }
    }
}

impl ProxyConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Whether failed reads also publish the legacy duplicate.
    pub fn emits_legacy_load_exception(&self) -> bool {
        cfg!(feature = "legacy-events") && self.legacy_load_exception
    }
}
