pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::LocalFileSystem;
pub use config::CatalogConfig;
pub use core::{
    builder::Registry, dataset::Dataset, model_dataset::TorchModelDataset,
    study_dataset::StudyDataset, version::VersionResolver,
};
pub use utils::error::{DatasetError, Result};
