pub mod builder;
pub mod dataset;
pub mod model_dataset;
pub mod study_dataset;
pub mod version;

pub use crate::domain::model::{Credentials, LoadMethod, StrategyConfig, Version};
pub use crate::domain::ports::{Args, FileSystem, ModelClass, StudySource, StudyStorage, VersionStore};
pub use crate::utils::error::Result;
