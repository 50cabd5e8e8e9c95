// Adapters layer: concrete implementations of domain ports for external systems.

pub mod local_fs;

pub use local_fs::LocalFileSystem;
