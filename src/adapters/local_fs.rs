use crate::domain::ports::FileSystem;
use crate::utils::error::{DatasetError, Result};
use std::fs;
use std::path::Path;

/// Local disk access for the `file` protocol.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    fn protocol(&self) -> &str {
        "file"
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(Path::new(path).try_exists()?)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let mut matches = Vec::new();
        for entry in glob::glob(pattern)? {
            let path = entry.map_err(|e| DatasetError::backend("glob", e))?;
            matches.push(path.to_string_lossy().into_owned());
        }
        Ok(matches)
    }

    fn makedirs(&self, path: &str) -> Result<()> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    // Nothing is cached for local paths.
    fn invalidate_cache(&self, _path: &str) {}
}
