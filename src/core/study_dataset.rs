use crate::config::catalog::StudyDatasetConfig;
use crate::config::credentials::{is_file_backed, resolve_credentials_with, StorageUrl};
use crate::core::builder::{build, Registry};
use crate::core::dataset::{describe_to_string, Dataset};
use crate::core::version::VersionResolver;
use crate::domain::model::{Credentials, StrategyConfig, Version};
use crate::domain::ports::{StudySource, StudyStorage, VersionStore};
use crate::utils::error::{DatasetError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Optional strategy objects attached to a loaded study.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyLoadArgs {
    pub sampler: Option<StrategyConfig>,
    pub pruner: Option<StrategyConfig>,
}

struct StudyNames<'a, S: StudyStorage> {
    dataset: &'a StudyDataset<S>,
}

impl<S: StudyStorage> VersionStore for StudyNames<'_, S> {
    fn exists(&self, identifier: &str) -> Result<bool> {
        self.dataset.study_name_exists(identifier)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        self.dataset.study_name_glob(pattern)
    }
}

/// An optimisation study kept in a relational database.
///
/// Versions are separate studies named `study/<version>/study` inside the
/// same database; the database location itself never changes.
pub struct StudyDataset<S: StudyStorage> {
    backend: String,
    database: String,
    study_name: String,
    storage_url: StorageUrl,
    filepath: Option<PathBuf>,
    load_args: StudyLoadArgs,
    samplers: Registry<S::Sampler>,
    pruners: Registry<S::Pruner>,
    storage: S,
    versions: VersionResolver,
    metadata: Option<Value>,
}

impl<S: StudyStorage> StudyDataset<S> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backend: &str,
        database: &str,
        study_name: &str,
        credentials: Credentials,
        version: Option<Version>,
        storage: S,
        samplers: Registry<S::Sampler>,
        pruners: Registry<S::Pruner>,
    ) -> Result<Self> {
        let storage_url = StorageUrl::build(backend, database, &credentials)?;
        let filepath = if is_file_backed(backend) {
            Some(absolute_path(database)?)
        } else {
            None
        };

        Ok(Self {
            backend: backend.to_string(),
            database: database.to_string(),
            study_name: study_name.to_string(),
            storage_url,
            filepath,
            load_args: StudyLoadArgs::default(),
            samplers,
            pruners,
            storage,
            versions: VersionResolver::repeating(study_name, version),
            metadata: None,
        })
    }

    /// Builds the dataset from its catalog entry. Explicit credentials win
    /// over `DB_*` environment variables.
    pub fn from_config(
        config: &StudyDatasetConfig,
        version: Option<Version>,
        storage: S,
        samplers: Registry<S::Sampler>,
        pruners: Registry<S::Pruner>,
    ) -> Result<Self> {
        Self::from_config_with_env(config, version, storage, samplers, pruners, |key| {
            std::env::var(key).ok()
        })
    }

    /// Like [`StudyDataset::from_config`], reading `DB_*` defaults through `lookup`.
    pub fn from_config_with_env<F>(
        config: &StudyDatasetConfig,
        version: Option<Version>,
        storage: S,
        samplers: Registry<S::Sampler>,
        pruners: Registry<S::Pruner>,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials =
            resolve_credentials_with(&config.backend, config.credentials.clone(), lookup)?;
        Ok(Self::new(
            &config.backend,
            &config.database,
            &config.study_name,
            credentials,
            version,
            storage,
            samplers,
            pruners,
        )?
        .with_load_args(config.load_args.clone())
        .with_metadata(config.metadata.clone()))
    }

    pub fn with_load_args(mut self, load_args: StudyLoadArgs) -> Self {
        self.load_args = load_args;
        self
    }

    pub fn with_metadata(mut self, metadata: Option<Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_version_generator(mut self, generator: fn() -> String) -> Self {
        self.versions = self.versions.with_generator(generator);
        self
    }

    pub fn storage_url(&self) -> &StorageUrl {
        &self.storage_url
    }

    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    fn store_file_missing(&self) -> bool {
        self.filepath.as_deref().is_some_and(|path| !path.is_file())
    }

    pub fn study_name_exists(&self, study_name: &str) -> Result<bool> {
        if self.store_file_missing() {
            return Ok(false);
        }
        let names = self.storage.study_names(self.storage_url.as_str())?;
        Ok(names.iter().any(|name| name == study_name))
    }

    /// Study names matching `pattern`; `*` also matches `/`.
    pub fn study_name_glob(&self, pattern: &str) -> Result<Vec<String>> {
        if self.store_file_missing() {
            return Ok(Vec::new());
        }
        let pattern = fnmatch_pattern(pattern)?;
        let names = self.storage.study_names(self.storage_url.as_str())?;
        Ok(names.into_iter().filter(|name| pattern.matches(name)).collect())
    }

    fn study_names(&self) -> StudyNames<'_, S> {
        StudyNames { dataset: self }
    }

    pub fn load_study_name(&self) -> Result<String> {
        self.versions.resolve_load(&self.study_names(), &self.to_string())
    }

    pub fn save_study_name(&self) -> Result<String> {
        self.versions.resolve_save(&self.study_names(), &self.to_string())
    }

    fn ensure_store(&self) -> Result<()> {
        let Some(path) = &self.filepath else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !path.is_file() {
            tracing::info!("Initialising empty study storage at {}", path.display());
            self.storage.create_empty(self.storage_url.as_str())?;
        }
        Ok(())
    }
}

/// Compiles a shell-style pattern. Runs of `*` collapse to one, since a
/// single `*` already crosses `/` under the default match options.
fn fnmatch_pattern(pattern: &str) -> Result<glob::Pattern> {
    let mut collapsed = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }
    Ok(glob::Pattern::new(&collapsed)?)
}

/// Absolute form of `database`, which need not exist yet.
fn absolute_path(database: &str) -> Result<PathBuf> {
    let path = Path::new(database);
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

impl<S: StudyStorage> Dataset for StudyDataset<S> {
    type Data = S::Study;

    fn load(&self) -> Result<S::Study> {
        tracing::debug!("Loading {}", self);
        let mut load_args = self.load_args.clone();
        let sampler = build(load_args.sampler.as_mut(), &self.samplers, &self.study_name)?;
        let pruner = build(load_args.pruner.as_mut(), &self.pruners, &self.study_name)?;

        let study_name = self.load_study_name()?;
        if !self.study_name_exists(&study_name)? {
            return Err(DatasetError::NotFound {
                identifier: study_name,
                dataset: self.to_string(),
            });
        }

        self.storage
            .load_study(self.storage_url.as_str(), &study_name, sampler, pruner)
    }

    /// Copies `study` into this dataset's storage.
    ///
    /// Not transactional: a failed copy may leave a partial study behind.
    fn save(&self, study: &S::Study) -> Result<()> {
        tracing::debug!("Saving {}", self);
        self.versions.clear_cache();
        let save_study_name = self.save_study_name()?;

        self.ensure_store()?;

        if self.study_name_exists(&save_study_name)? {
            tracing::info!("Replacing existing study '{}'", save_study_name);
            self.storage
                .delete_study(self.storage_url.as_str(), &save_study_name)?;
        }

        tracing::info!(
            "Copying study '{}' to '{}' in {}",
            study.study_name(),
            save_study_name,
            self.storage_url.redacted()
        );
        self.storage.copy_study(
            study.study_name(),
            study.storage_url(),
            self.storage_url.as_str(),
            &save_study_name,
        )?;

        self.versions
            .check_consistency(&self.study_names(), &self.to_string());
        Ok(())
    }

    fn exists(&self) -> Result<bool> {
        match self.load_study_name() {
            Ok(name) => self.study_name_exists(&name),
            Err(DatasetError::VersionNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn release(&self) {
        self.versions.clear_cache();
    }

    fn describe(&self) -> Map<String, Value> {
        let mut description = Map::new();
        description.insert("backend".into(), json!(self.backend));
        description.insert("database".into(), json!(self.database));
        description.insert("study_name".into(), json!(self.study_name));
        description.insert("load_args".into(), json!(self.load_args));
        description.insert("version".into(), json!(self.versions.version()));
        description
    }
}

impl<S: StudyStorage> fmt::Display for StudyDataset<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe_to_string("StudyDataset", &self.describe()))
    }
}
