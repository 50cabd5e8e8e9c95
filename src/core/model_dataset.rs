use crate::config::catalog::ModelDatasetConfig;
use crate::core::builder::Registry;
use crate::core::dataset::{describe_to_string, Dataset};
use crate::core::version::VersionResolver;
use crate::domain::model::{LoadMethod, Version};
use crate::domain::ports::{Args, FileSystem, ModelClass, VersionStore};
use crate::utils::error::{DatasetError, Result};
use serde_json::{json, Map, Value};
use std::fmt;

const PROTOCOL_DELIMITER: &str = "://";
const HTTP_PROTOCOLS: [&str; 2] = ["http", "https"];

/// Splits `s3://bucket/key` into `("s3", "bucket/key")`.
///
/// Paths without a protocol, and Windows drive letters, map to `file`.
/// HTTP(S) locations cannot be versioned.
pub fn protocol_and_path(filepath: &str, versioned: bool) -> Result<(String, String)> {
    let (protocol, path) = match filepath.split_once(PROTOCOL_DELIMITER) {
        Some((protocol, path)) if protocol.len() > 1 => (protocol.to_string(), path.to_string()),
        _ => ("file".to_string(), filepath.to_string()),
    };

    if HTTP_PROTOCOLS.contains(&protocol.as_str()) && versioned {
        return Err(DatasetError::config(format!(
            "Versioning is not supported for HTTP protocols: '{}'",
            filepath
        )));
    }

    Ok((protocol, path))
}

/// Path handed to the filesystem; HTTP(S) keeps its protocol prefix.
pub fn filepath_str(path: &str, protocol: &str) -> String {
    if HTTP_PROTOCOLS.contains(&protocol) {
        format!("{}{}{}", protocol, PROTOCOL_DELIMITER, path)
    } else {
        path.to_string()
    }
}

pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

/// Exposes a filesystem to the version resolver.
pub struct FsVersions<'a, F: FileSystem> {
    fs: &'a F,
    protocol: &'a str,
}

impl<'a, F: FileSystem> FsVersions<'a, F> {
    pub fn new(fs: &'a F, protocol: &'a str) -> Self {
        Self { fs, protocol }
    }
}

impl<F: FileSystem> VersionStore for FsVersions<'_, F> {
    fn exists(&self, identifier: &str) -> Result<bool> {
        self.fs.exists(&filepath_str(identifier, self.protocol))
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        self.fs.glob(&filepath_str(pattern, self.protocol))
    }
}

/// A forecasting model persisted as a (versioned) file.
pub struct TorchModelDataset<M: ModelClass, F: FileSystem> {
    filepath: String,
    protocol: String,
    model_class: M,
    fs: F,
    load_args: Args,
    save_args: Args,
    versions: VersionResolver,
    metadata: Option<Value>,
}

impl<M: ModelClass, F: FileSystem> TorchModelDataset<M, F> {
    pub fn new(filepath: &str, model_class: M, fs: F, version: Option<Version>) -> Result<Self> {
        let (protocol, path) = protocol_and_path(filepath, version.is_some())?;
        if fs.protocol() != protocol {
            return Err(DatasetError::config(format!(
                "Filesystem serves '{}' but '{}' uses protocol '{}'",
                fs.protocol(),
                filepath,
                protocol
            )));
        }

        let leaf = file_name(&path).to_string();
        Ok(Self {
            versions: VersionResolver::new(path.clone(), leaf, version),
            filepath: path,
            protocol,
            model_class,
            fs,
            load_args: Map::new(),
            save_args: Map::new(),
            metadata: None,
        })
    }

    /// Resolves `model_class` by name before building the dataset.
    pub fn from_registry(
        filepath: &str,
        model_class: &str,
        registry: &Registry<M>,
        fs: F,
        version: Option<Version>,
    ) -> Result<Self> {
        let model_class = registry.construct(model_class, Map::new(), filepath)?;
        Self::new(filepath, model_class, fs, version)
    }

    pub fn from_config(
        config: &ModelDatasetConfig,
        version: Option<Version>,
        registry: &Registry<M>,
        fs: F,
    ) -> Result<Self> {
        Ok(
            Self::from_registry(&config.filepath, &config.model_class, registry, fs, version)?
                .with_load_args(config.load_args.clone())
                .with_save_args(config.save_args.clone())
                .with_metadata(config.metadata.clone()),
        )
    }

    pub fn with_load_args(mut self, load_args: Args) -> Self {
        self.load_args = load_args;
        self
    }

    pub fn with_save_args(mut self, save_args: Args) -> Self {
        self.save_args = save_args;
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

    pub fn filepath(&self) -> &str {
        &self.filepath
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    fn version_store(&self) -> FsVersions<'_, F> {
        FsVersions::new(&self.fs, &self.protocol)
    }

    pub fn load_path(&self) -> Result<String> {
        let path = self.versions.resolve_load(&self.version_store(), &self.to_string())?;
        Ok(filepath_str(&path, &self.protocol))
    }

    pub fn save_path(&self) -> Result<String> {
        let path = self.versions.resolve_save(&self.version_store(), &self.to_string())?;
        Ok(filepath_str(&path, &self.protocol))
    }

    fn take_model_name(args: &mut Args, method: LoadMethod) -> Result<String> {
        match args.remove("model_name") {
            Some(Value::String(name)) => Ok(name),
            Some(Value::Null) | None => Err(DatasetError::MissingArgument {
                argument: "model_name".to_string(),
                method: method.to_string(),
            }),
            Some(other) => Err(DatasetError::InvalidConfigValueError {
                field: "load_args.model_name".to_string(),
                value: other.to_string(),
                reason: "model_name must be a string".to_string(),
            }),
        }
    }

    fn take_load_method(args: &mut Args) -> Result<LoadMethod> {
        match args.remove("load_method") {
            None | Some(Value::Null) => Ok(LoadMethod::default()),
            Some(Value::String(method)) => method.parse(),
            Some(other) => Err(DatasetError::UnsupportedMethod {
                method: other.to_string(),
            }),
        }
    }

    fn take_save_model(args: &mut Args) -> Result<bool> {
        match args.remove("save_model") {
            None | Some(Value::Null) => Ok(true),
            Some(Value::Bool(flag)) => Ok(flag),
            Some(other) => Err(DatasetError::InvalidConfigValueError {
                field: "save_args.save_model".to_string(),
                value: other.to_string(),
                reason: "save_model must be a boolean".to_string(),
            }),
        }
    }
}

impl<M: ModelClass, F: FileSystem> Dataset for TorchModelDataset<M, F> {
    type Data = M::Model;

    fn load(&self) -> Result<M::Model> {
        tracing::debug!("Loading {}", self);
        let mut args = self.load_args.clone();
        let method = Self::take_load_method(&mut args)?;

        match method {
            LoadMethod::Load => {
                let path = self.load_path()?;
                self.model_class.load(&path, &args)
            }
            LoadMethod::LoadFromCheckpoint => {
                let model_name = Self::take_model_name(&mut args, method)?;
                self.model_class.load_from_checkpoint(&model_name, &args)
            }
            LoadMethod::LoadWeights => {
                let path = self.load_path()?;
                self.model_class.load_weights(&path, &args)
            }
            LoadMethod::LoadWeightsFromCheckpoint => {
                let model_name = Self::take_model_name(&mut args, method)?;
                self.model_class.load_weights_from_checkpoint(&model_name, &args)
            }
        }
    }

    fn save(&self, model: &M::Model) -> Result<()> {
        tracing::debug!("Saving {}", self);
        let mut args = self.save_args.clone();
        if !Self::take_save_model(&mut args)? {
            tracing::debug!("Skipping model save for {}: save_model is false", self);
            return Ok(());
        }

        self.versions.clear_cache();
        let path = self.save_path()?;
        if let Some((parent, _)) = path.rsplit_once('/') {
            if !parent.is_empty() {
                self.fs.makedirs(parent)?;
            }
        }
        self.model_class.save(model, &path, &args)?;
        self.fs.invalidate_cache(&path);

        self.versions
            .check_consistency(&self.version_store(), &self.to_string());
        Ok(())
    }

    /// Any error while resolving or checking the path reads as "absent".
    fn exists(&self) -> Result<bool> {
        let exists = self
            .load_path()
            .and_then(|path| self.fs.exists(&path))
            .unwrap_or_else(|e| {
                tracing::debug!("Treating {} as missing: {}", self, e);
                false
            });
        Ok(exists)
    }

    fn release(&self) {
        self.versions.clear_cache();
        self.fs
            .invalidate_cache(&filepath_str(&self.filepath, &self.protocol));
    }

    fn describe(&self) -> Map<String, Value> {
        let mut description = Map::new();
        description.insert("filepath".into(), json!(self.filepath));
        description.insert("protocol".into(), json!(self.protocol));
        description.insert("model_class".into(), json!(self.model_class.name()));
        description.insert("load_args".into(), Value::Object(self.load_args.clone()));
        description.insert("save_args".into(), Value::Object(self.save_args.clone()));
        description.insert("version".into(), json!(self.versions.version()));
        description.insert("metadata".into(), self.metadata.clone().unwrap_or(Value::Null));
        description
    }
}

impl<M: ModelClass, F: FileSystem> fmt::Display for TorchModelDataset<M, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe_to_string("TorchModelDataset", &self.describe()))
    }
}
