use crate::utils::error::Result;
use serde_json::{Map, Value};

/// Keyword arguments passed through to a collaborator untouched.
pub type Args = Map<String, Value>;

/// Where the versioning layer looks for existing versions.
pub trait VersionStore {
    fn exists(&self, identifier: &str) -> Result<bool>;
    fn glob(&self, pattern: &str) -> Result<Vec<String>>;
}

pub trait FileSystem: Send + Sync {
    /// Protocol this filesystem serves, e.g. `file` or `s3`.
    fn protocol(&self) -> &str;
    fn exists(&self, path: &str) -> Result<bool>;
    fn glob(&self, pattern: &str) -> Result<Vec<String>>;
    fn makedirs(&self, path: &str) -> Result<()>;
    fn invalidate_cache(&self, path: &str);
}

/// A study as seen by the code that saves it: where it currently lives.
pub trait StudySource {
    fn study_name(&self) -> &str;
    fn storage_url(&self) -> &str;
}

/// Persistence backend for optimisation studies.
///
/// Storage arguments are database URLs; studies are addressed by name inside
/// one storage.
pub trait StudyStorage: Send + Sync {
    type Study: StudySource;
    type Sampler;
    type Pruner;

    fn study_names(&self, storage: &str) -> Result<Vec<String>>;

    /// Initialises an empty store so that later copies have a target.
    fn create_empty(&self, storage: &str) -> Result<()>;

    fn delete_study(&self, storage: &str, study_name: &str) -> Result<()>;

    /// Copies every record of a study, trials included, into another storage.
    fn copy_study(
        &self,
        from_study_name: &str,
        from_storage: &str,
        to_storage: &str,
        to_study_name: &str,
    ) -> Result<()>;

    fn load_study(
        &self,
        storage: &str,
        study_name: &str,
        sampler: Option<Self::Sampler>,
        pruner: Option<Self::Pruner>,
    ) -> Result<Self::Study>;
}

/// A forecasting model type and its own save/load routines.
pub trait ModelClass: Send + Sync {
    type Model;

    fn name(&self) -> &str;
    fn load(&self, path: &str, args: &Args) -> Result<Self::Model>;
    fn load_from_checkpoint(&self, model_name: &str, args: &Args) -> Result<Self::Model>;
    fn load_weights(&self, path: &str, args: &Args) -> Result<Self::Model>;
    fn load_weights_from_checkpoint(&self, model_name: &str, args: &Args)
        -> Result<Self::Model>;
    fn save(&self, model: &Self::Model, path: &str, args: &Args) -> Result<()>;
}
