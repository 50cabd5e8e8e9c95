use crate::core::model_dataset::protocol_and_path;
use crate::core::study_dataset::StudyLoadArgs;
use crate::domain::model::{Credentials, LoadMethod, Version};
use crate::domain::ports::Args;
use crate::utils::error::{DatasetError, Result};
use crate::utils::validation::{
    validate_backend, validate_non_empty_string, validate_path, validate_version_token, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Declarative dataset definitions, keyed by dataset name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Save version shared by every versioned dataset in one run.
    pub save_version: Option<String>,
    #[serde(default)]
    pub datasets: BTreeMap<String, DatasetConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DatasetConfig {
    #[serde(rename = "optuna.StudyDataset")]
    Study(StudyDatasetConfig),
    #[serde(rename = "darts.TorchModelDataset")]
    TorchModel(ModelDatasetConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyDatasetConfig {
    pub backend: String,
    pub database: String,
    pub study_name: String,
    #[serde(default)]
    pub load_args: StudyLoadArgs,
    pub credentials: Option<Credentials>,
    #[serde(default)]
    pub versioned: bool,
    pub load_version: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDatasetConfig {
    pub filepath: String,
    pub model_class: String,
    #[serde(default)]
    pub load_args: Args,
    #[serde(default)]
    pub save_args: Args,
    #[serde(default)]
    pub versioned: bool,
    pub load_version: Option<String>,
    pub metadata: Option<Value>,
}

fn version_for(
    versioned: bool,
    load_version: &Option<String>,
    save_version: Option<&str>,
) -> Option<Version> {
    versioned.then(|| Version::new(load_version.clone(), save_version.map(str::to_string)))
}

impl StudyDatasetConfig {
    pub fn version(&self, save_version: Option<&str>) -> Option<Version> {
        version_for(self.versioned, &self.load_version, save_version)
    }

    fn validate_entry(&self, name: &str) -> Result<()> {
        validate_backend(&format!("{name}.backend"), &self.backend)?;
        validate_non_empty_string(&format!("{name}.database"), &self.database)?;
        validate_non_empty_string(&format!("{name}.study_name"), &self.study_name)?;
        validate_versioning(name, self.versioned, &self.load_version)
    }
}

impl ModelDatasetConfig {
    pub fn version(&self, save_version: Option<&str>) -> Option<Version> {
        version_for(self.versioned, &self.load_version, save_version)
    }

    fn validate_entry(&self, name: &str) -> Result<()> {
        validate_path(&format!("{name}.filepath"), &self.filepath)?;
        validate_non_empty_string(&format!("{name}.model_class"), &self.model_class)?;
        protocol_and_path(&self.filepath, self.versioned)?;

        if let Some(method) = self.load_args.get("load_method") {
            let method = method.as_str().ok_or_else(|| DatasetError::UnsupportedMethod {
                method: method.to_string(),
            })?;
            let method: LoadMethod = method.parse()?;
            if method.uses_checkpoint() && !self.load_args.contains_key("model_name") {
                return Err(DatasetError::MissingArgument {
                    argument: "model_name".to_string(),
                    method: method.to_string(),
                });
            }
        }
        if let Some(flag) = self.save_args.get("save_model") {
            if !flag.is_boolean() {
                return Err(DatasetError::InvalidConfigValueError {
                    field: format!("{name}.save_args.save_model"),
                    value: flag.to_string(),
                    reason: "save_model must be a boolean".to_string(),
                });
            }
        }
        validate_versioning(name, self.versioned, &self.load_version)
    }
}

fn validate_versioning(name: &str, versioned: bool, load_version: &Option<String>) -> Result<()> {
    match load_version {
        Some(_) if !versioned => Err(DatasetError::config(format!(
            "{name}: load_version is set but versioning is disabled"
        ))),
        Some(token) => validate_version_token(&format!("{name}.load_version"), token),
        None => Ok(()),
    }
}

fn env_var_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"))
}

impl CatalogConfig {
    /// Reads and parses a catalog file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses a catalog after `${VAR}` substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with its environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        env_var_regex()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn dataset(&self, name: &str) -> Result<&DatasetConfig> {
        self.datasets
            .get(name)
            .ok_or_else(|| DatasetError::MissingConfigError {
                field: format!("datasets.{name}"),
            })
    }

    pub fn save_version(&self) -> Option<&str> {
        self.save_version.as_deref()
    }
}

impl Validate for CatalogConfig {
    fn validate(&self) -> Result<()> {
        if let Some(token) = &self.save_version {
            validate_version_token("save_version", token)?;
        }
        for (name, dataset) in &self.datasets {
            match dataset {
                DatasetConfig::Study(study) => study.validate_entry(name)?,
                DatasetConfig::TorchModel(model) => model.validate_entry(name)?,
            }
        }
        Ok(())
    }
}
