pub mod catalog;
pub mod credentials;

#[cfg(feature = "cli")]
pub mod cli;

pub use catalog::{CatalogConfig, DatasetConfig, ModelDatasetConfig, StudyDatasetConfig};
