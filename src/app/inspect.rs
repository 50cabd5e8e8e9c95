use crate::adapters::LocalFileSystem;
use crate::config::credentials::{resolve_credentials, StorageUrl};
use crate::config::{CatalogConfig, DatasetConfig};
use crate::core::model_dataset::{file_name, protocol_and_path, FsVersions};
use crate::core::version::VersionResolver;
use crate::domain::model::Version;
use crate::utils::error::{DatasetError, Result};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "version")]
pub enum VersionState {
    Disabled,
    Latest(String),
    Pinned(String),
    NoVersions,
    /// Only local files can be listed without a backend connection.
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    pub name: String,
    pub kind: &'static str,
    pub location: String,
    pub versions: VersionState,
    pub definition: Value,
}

/// Summarises where each catalog entry lives and which version it loads.
pub fn inspect(catalog: &CatalogConfig, only: Option<&str>) -> Result<Vec<DatasetReport>> {
    let selected: Vec<(&String, &DatasetConfig)> = match only {
        Some(name) => {
            let (key, config) = catalog.datasets.get_key_value(name).ok_or_else(|| {
                DatasetError::MissingConfigError {
                    field: format!("datasets.{name}"),
                }
            })?;
            vec![(key, config)]
        }
        None => catalog.datasets.iter().collect(),
    };

    selected
        .into_iter()
        .map(|(name, config)| inspect_entry(name, config, catalog.save_version()))
        .collect()
}

fn inspect_entry(
    name: &str,
    config: &DatasetConfig,
    save_version: Option<&str>,
) -> Result<DatasetReport> {
    let mut definition = serde_json::to_value(config)?;
    if let Some(password) = definition.pointer_mut("/credentials/password") {
        if !password.is_null() {
            *password = Value::from("***");
        }
    }
    match config {
        DatasetConfig::Study(study) => {
            let credentials = resolve_credentials(&study.backend, study.credentials.clone())?;
            let url = StorageUrl::build(&study.backend, &study.database, &credentials)?;
            let versions = match study.version(save_version) {
                None => VersionState::Disabled,
                Some(Version {
                    load: Some(pinned), ..
                }) => VersionState::Pinned(pinned),
                Some(_) => VersionState::Unknown,
            };
            Ok(DatasetReport {
                name: name.to_string(),
                kind: "optuna.StudyDataset",
                location: format!("{} :: {}", url.redacted(), study.study_name),
                versions,
                definition,
            })
        }
        DatasetConfig::TorchModel(model) => {
            let version = model.version(save_version);
            let (protocol, path) = protocol_and_path(&model.filepath, version.is_some())?;
            let versions = match version {
                None => VersionState::Disabled,
                Some(Version {
                    load: Some(pinned), ..
                }) => VersionState::Pinned(pinned),
                Some(_) if protocol != "file" => VersionState::Unknown,
                Some(version) => {
                    let fs = LocalFileSystem::new();
                    let resolver =
                        VersionResolver::new(path.clone(), file_name(&path), Some(version));
                    match resolver.load_version(&FsVersions::new(&fs, &protocol), name) {
                        Ok(Some(latest)) => VersionState::Latest(latest),
                        Ok(None) => VersionState::Disabled,
                        Err(DatasetError::VersionNotFound { .. }) => VersionState::NoVersions,
                        Err(e) => return Err(e),
                    }
                }
            };
            Ok(DatasetReport {
                name: name.to_string(),
                kind: "darts.TorchModelDataset",
                location: format!("{}://{}", protocol, path),
                versions,
                definition,
            })
        }
    }
}
