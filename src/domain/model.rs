use crate::utils::error::{DatasetError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Version token format shared with the catalog's versioning layer.
pub const VERSION_FORMAT: &str = "%Y-%m-%dT%H.%M.%S%.3fZ";

/// Generates a save version from the current UTC time.
pub fn generate_timestamp() -> String {
    chrono::Utc::now().format(VERSION_FORMAT).to_string()
}

/// Pinned load/save versions of a versioned dataset.
///
/// `None` on either side means "resolve it": the latest existing version for
/// loads and a freshly generated one for saves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub load: Option<String>,
    pub save: Option<String>,
}

impl Version {
    pub fn new(load: Option<String>, save: Option<String>) -> Self {
        Self {
            load: load.filter(|v| v != "latest"),
            save: save.filter(|v| v != "auto"),
        }
    }

    pub fn latest() -> Self {
        Self::default()
    }
}

/// `base/version/leaf`, the physical identifier of one version.
pub fn versioned_path(base: &str, version: &str, leaf: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), version, leaf)
}

/// Declarative description of an object to build from a registry.
///
/// The `class` entry names the registered type; every other entry becomes a
/// constructor argument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyConfig(pub Map<String, Value>);

impl StrategyConfig {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn with_class(class: &str) -> Self {
        let mut map = Map::new();
        map.insert("class".to_string(), Value::String(class.to_string()));
        Self(map)
    }

    pub fn arg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn contains_class(&self) -> bool {
        self.0.contains_key("class")
    }

    /// Removes the `class` entry, leaving only constructor arguments behind.
    pub fn take_class(&mut self) -> Option<Value> {
        self.0.remove("class")
    }

    pub fn args(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Database credentials; any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.host.is_none()
            && self.port.is_none()
    }
}

/// The ways a forecasting model can be reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMethod {
    #[default]
    Load,
    LoadFromCheckpoint,
    LoadWeights,
    LoadWeightsFromCheckpoint,
}

impl LoadMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadMethod::Load => "load",
            LoadMethod::LoadFromCheckpoint => "load_from_checkpoint",
            LoadMethod::LoadWeights => "load_weights",
            LoadMethod::LoadWeightsFromCheckpoint => "load_weights_from_checkpoint",
        }
    }

    /// Checkpoint methods locate the model by name instead of by path.
    pub fn uses_checkpoint(&self) -> bool {
        matches!(
            self,
            LoadMethod::LoadFromCheckpoint | LoadMethod::LoadWeightsFromCheckpoint
        )
    }
}

impl FromStr for LoadMethod {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "load" => Ok(LoadMethod::Load),
            "load_from_checkpoint" => Ok(LoadMethod::LoadFromCheckpoint),
            "load_weights" => Ok(LoadMethod::LoadWeights),
            "load_weights_from_checkpoint" => Ok(LoadMethod::LoadWeightsFromCheckpoint),
            other => Err(DatasetError::UnsupportedMethod {
                method: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LoadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
