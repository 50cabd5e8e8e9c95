use crate::domain::model::StrategyConfig;
use crate::domain::ports::Args;
use crate::utils::error::{BoxError, DatasetError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

type Factory<T> = Box<dyn Fn(Args) -> std::result::Result<T, BoxError> + Send + Sync>;

struct Entry<T> {
    params: Vec<String>,
    factory: Factory<T>,
}

/// Closed set of constructible types, looked up by class name.
///
/// Each entry declares the keyword arguments its constructor accepts so that
/// misspelled options fail at build time instead of being ignored.
pub struct Registry<T> {
    kind: String,
    entries: BTreeMap<String, Entry<T>>,
}

impl<T> Registry<T> {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn register<F>(mut self, class: &str, params: &[&str], factory: F) -> Self
    where
        F: Fn(Args) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        self.entries.insert(
            class.to_string(),
            Entry {
                params: params.iter().map(|p| p.to_string()).collect(),
                factory: Box::new(factory),
            },
        );
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn contains(&self, class: &str) -> bool {
        self.entries.contains_key(class)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Instantiates `class` with `args`, validating argument names first.
    pub fn construct(&self, class: &str, args: Args, resource: &str) -> Result<T> {
        let entry = self
            .entries
            .get(class)
            .ok_or_else(|| DatasetError::UnknownClass {
                kind: self.kind.clone(),
                name: class.to_string(),
                known: self.names().collect::<Vec<_>>().join(", "),
            })?;

        if let Some(argument) = args.keys().find(|key| !entry.params.contains(*key)) {
            return Err(DatasetError::UnexpectedArgument {
                kind: self.kind.clone(),
                class: class.to_string(),
                argument: argument.clone(),
            });
        }

        tracing::debug!("Constructing {} '{}' for `{}`", self.kind, class, resource);
        (entry.factory)(args).map_err(|source| DatasetError::ObjectConstruction {
            kind: self.kind.clone(),
            class: class.to_string(),
            resource: resource.to_string(),
            source,
        })
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("classes", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builds the object described by `config`, or `None` when nothing is
/// configured and the backend default should apply.
///
/// The `class` entry is removed from `config`; pass a copy if the original
/// is needed afterwards.
pub fn build<T>(
    config: Option<&mut StrategyConfig>,
    registry: &Registry<T>,
    resource: &str,
) -> Result<Option<T>> {
    let Some(config) = config else {
        return Ok(None);
    };

    let class = match config.take_class() {
        Some(Value::String(class)) => class,
        Some(other) => {
            return Err(DatasetError::InvalidConfigValueError {
                field: format!("{}.class", registry.kind()),
                value: other.to_string(),
                reason: "Class name must be a string".to_string(),
            })
        }
        None => {
            return Err(DatasetError::MissingClassKey {
                kind: registry.kind().to_string(),
                resource: resource.to_string(),
            })
        }
    };

    registry
        .construct(&class, config.args().clone(), resource)
        .map(Some)
}
