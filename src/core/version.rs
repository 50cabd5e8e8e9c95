use crate::domain::model::{generate_timestamp, versioned_path, Version};
use crate::domain::ports::VersionStore;
use crate::utils::error::{DatasetError, Result};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct VersionCache {
    load: Option<String>,
    save: Option<String>,
}

/// Maps a logical name to the identifier a load or save should use.
///
/// Versioned identifiers follow `base/<version>/leaf`. Studies repeat their
/// name as the leaf, files use their file name. Resolved versions are cached
/// until [`VersionResolver::clear_cache`] runs, which datasets do on every
/// save and on release.
#[derive(Debug)]
pub struct VersionResolver {
    base: String,
    leaf: String,
    version: Option<Version>,
    generator: fn() -> String,
    cache: Mutex<VersionCache>,
}

impl VersionResolver {
    pub fn new(base: impl Into<String>, leaf: impl Into<String>, version: Option<Version>) -> Self {
        Self {
            base: base.into(),
            leaf: leaf.into(),
            version,
            generator: generate_timestamp,
            cache: Mutex::new(VersionCache::default()),
        }
    }

    /// Resolver whose leaf is the logical name itself.
    pub fn repeating(name: impl Into<String>, version: Option<Version>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, version)
    }

    pub fn with_generator(mut self, generator: fn() -> String) -> Self {
        self.generator = generator;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.version.is_some()
    }

    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    pub fn logical_name(&self) -> &str {
        &self.base
    }

    pub fn versioned_identifier(&self, version: &str) -> String {
        versioned_path(&self.base, version, &self.leaf)
    }

    fn cache(&self) -> MutexGuard<'_, VersionCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn clear_cache(&self) {
        *self.cache() = VersionCache::default();
    }

    /// Version a load should read; `None` when versioning is disabled.
    pub fn load_version(&self, store: &dyn VersionStore, dataset: &str) -> Result<Option<String>> {
        let Some(version) = &self.version else {
            return Ok(None);
        };
        if let Some(cached) = self.cache().load.clone() {
            return Ok(Some(cached));
        }
        let resolved = match &version.load {
            Some(pinned) => pinned.clone(),
            None => self.fetch_latest_version(store, dataset)?,
        };
        self.cache().load = Some(resolved.clone());
        Ok(Some(resolved))
    }

    /// Version a save should write; generated once per cache lifetime.
    pub fn save_version(&self) -> Option<String> {
        let version = self.version.as_ref()?;
        let mut cache = self.cache();
        let resolved = cache
            .save
            .get_or_insert_with(|| version.save.clone().unwrap_or_else(self.generator))
            .clone();
        Some(resolved)
    }

    pub fn resolve_load(&self, store: &dyn VersionStore, dataset: &str) -> Result<String> {
        match self.load_version(store, dataset)? {
            Some(version) => Ok(self.versioned_identifier(&version)),
            None => Ok(self.base.clone()),
        }
    }

    /// Fails with [`DatasetError::VersionConflict`] rather than overwrite an
    /// existing version. The check is not atomic with the write that follows.
    pub fn resolve_save(&self, store: &dyn VersionStore, dataset: &str) -> Result<String> {
        let Some(version) = self.save_version() else {
            return Ok(self.base.clone());
        };
        let identifier = self.versioned_identifier(&version);
        if store.exists(&identifier)? {
            return Err(DatasetError::VersionConflict {
                identifier,
                dataset: dataset.to_string(),
            });
        }
        Ok(identifier)
    }

    fn fetch_latest_version(&self, store: &dyn VersionStore, dataset: &str) -> Result<String> {
        let pattern = versioned_path(
            &glob::Pattern::escape(&self.base),
            "*",
            &glob::Pattern::escape(&self.leaf),
        );
        let prefix = format!("{}/", self.base.trim_end_matches('/'));
        let suffix = format!("/{}", self.leaf);

        let mut candidates: Vec<(String, String)> = store
            .glob(&pattern)?
            .into_iter()
            .filter_map(|path| {
                let version = path.strip_prefix(&prefix)?.strip_suffix(&suffix)?.to_string();
                Some((version, path))
            })
            .filter(|(version, _)| !version.is_empty())
            .collect();
        candidates.sort_by(|a, b| b.0.cmp(&a.0));

        for (version, path) in candidates {
            if store.exists(&path)? {
                tracing::debug!("Latest version of '{}' is '{}'", self.base, version);
                return Ok(version);
            }
        }

        Err(DatasetError::VersionNotFound {
            pattern,
            dataset: dataset.to_string(),
        })
    }

    /// Warns when the version just saved is not the one loads will read.
    pub fn check_consistency(&self, store: &dyn VersionStore, dataset: &str) {
        let Some(save_version) = self.save_version() else {
            return;
        };
        match self.load_version(store, dataset) {
            Ok(Some(load_version)) if load_version != save_version => {
                tracing::warn!(
                    "Save version '{}' did not match load version '{}' for {}. Pinning \
                     an exact load version for intermediate datasets is discouraged.",
                    save_version,
                    load_version,
                    dataset
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Could not resolve load version after saving {}: {}", dataset, e);
            }
        }
    }
}
