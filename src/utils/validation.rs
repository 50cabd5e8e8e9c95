use crate::utils::error::{DatasetError, Result};
use regex::Regex;
use std::sync::OnceLock;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn driver_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\+[A-Za-z][A-Za-z0-9_]*)?$").expect("valid regex")
    })
}

/// Backend names follow the `dialect[+driver]` form used in database URLs.
pub fn validate_backend(field_name: &str, backend: &str) -> Result<()> {
    if !driver_name_regex().is_match(backend) {
        return Err(DatasetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: backend.to_string(),
            reason: "Expected a database dialect such as 'sqlite' or 'postgresql+psycopg2'"
                .to_string(),
        });
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DatasetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DatasetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| DatasetError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DatasetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Version tokens become path segments, so they may not contain separators.
pub fn validate_version_token(field_name: &str, token: &str) -> Result<()> {
    validate_non_empty_string(field_name, token)?;
    if token.contains('/') || token.contains('*') {
        return Err(DatasetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: token.to_string(),
            reason: "Version must not contain '/' or '*'".to_string(),
        });
    }
    Ok(())
}
