use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("{kind} `class` should be specified when trying to load `{resource}` with a {kind}")]
    MissingClassKey { kind: String, resource: String },

    #[error("{kind} class '{name}' is not registered (known: {known})")]
    UnknownClass {
        kind: String,
        name: String,
        known: String,
    },

    #[error("{kind} class '{class}' does not accept argument '{argument}'")]
    UnexpectedArgument {
        kind: String,
        class: String,
        argument: String,
    },

    #[error("Unknown load method: {method}")]
    UnsupportedMethod { method: String },

    #[error("{argument} must be provided for '{method}' method")]
    MissingArgument { argument: String, method: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("'{identifier}' for {dataset} must not exist if versioning is enabled")]
    VersionConflict { identifier: String, dataset: String },

    #[error("Did not find any versions for {dataset} (pattern '{pattern}')")]
    VersionNotFound { pattern: String, dataset: String },

    #[error("'{identifier}' does not exist for {dataset}")]
    NotFound { identifier: String, dataset: String },

    #[error("Failed to construct {kind} '{class}' for `{resource}`: {source}")]
    ObjectConstruction {
        kind: String,
        class: String,
        resource: String,
        #[source]
        source: BoxError,
    },

    #[error("Backend operation '{operation}' failed: {source}")]
    Backend {
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid glob pattern: {0}")]
    PatternError(#[from] glob::PatternError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Version,
    NotFound,
    Backend,
    Io,
}

impl DatasetError {
    pub fn backend(operation: impl Into<String>, source: impl Into<BoxError>) -> Self {
        DatasetError::Backend {
            operation: operation.into(),
            source: source.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        DatasetError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DatasetError::MissingClassKey { .. }
            | DatasetError::UnknownClass { .. }
            | DatasetError::UnexpectedArgument { .. }
            | DatasetError::UnsupportedMethod { .. }
            | DatasetError::MissingArgument { .. }
            | DatasetError::ConfigError { .. }
            | DatasetError::InvalidConfigValueError { .. }
            | DatasetError::MissingConfigError { .. }
            | DatasetError::TomlError(_)
            | DatasetError::PatternError(_) => ErrorCategory::Configuration,
            DatasetError::VersionConflict { .. } | DatasetError::VersionNotFound { .. } => {
                ErrorCategory::Version
            }
            DatasetError::NotFound { .. } => ErrorCategory::NotFound,
            DatasetError::ObjectConstruction { .. } | DatasetError::Backend { .. } => {
                ErrorCategory::Backend
            }
            DatasetError::IoError(_) | DatasetError::SerializationError(_) => ErrorCategory::Io,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}

pub type Result<T> = std::result::Result<T, DatasetError>;
