use crate::domain::model::Credentials;
use crate::utils::error::{DatasetError, Result};
use url::Url;

pub const ENV_USERNAME: &str = "DB_USERNAME";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_PORT: &str = "DB_PORT";

impl Credentials {
    /// Reads `DB_USERNAME`, `DB_PASSWORD`, `DB_HOST` and `DB_PORT` through
    /// `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let port = match non_empty(ENV_PORT) {
            Some(raw) => Some(raw.parse::<u16>().map_err(|e| {
                DatasetError::InvalidConfigValueError {
                    field: ENV_PORT.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            username: non_empty(ENV_USERNAME),
            password: non_empty(ENV_PASSWORD),
            host: non_empty(ENV_HOST),
            port,
        })
    }

    /// Field-wise merge where values set on `self` win over `defaults`.
    pub fn or(self, defaults: Credentials) -> Credentials {
        Credentials {
            username: self.username.or(defaults.username),
            password: self.password.or(defaults.password),
            host: self.host.or(defaults.host),
            port: self.port.or(defaults.port),
        }
    }
}

/// Resolves the credentials a study storage connects with, defaulting
/// unset fields from the process environment.
pub fn resolve_credentials(backend: &str, explicit: Option<Credentials>) -> Result<Credentials> {
    resolve_credentials_with(backend, explicit, |key| std::env::var(key).ok())
}

/// Like [`resolve_credentials`], reading defaults through `lookup`.
///
/// File-backed backends never consult the environment.
pub fn resolve_credentials_with<F>(
    backend: &str,
    explicit: Option<Credentials>,
    lookup: F,
) -> Result<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let explicit = explicit.unwrap_or_default();
    if is_file_backed(backend) {
        return Ok(explicit);
    }
    Ok(explicit.or(Credentials::from_lookup(lookup)?))
}

/// Embedded backends keep the whole database in one local file.
pub fn is_file_backed(backend: &str) -> bool {
    backend == "sqlite" || backend.starts_with("sqlite+")
}

/// A database URL plus a copy safe to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUrl {
    url: String,
    redacted: String,
}

impl StorageUrl {
    /// Builds `backend://[user[:password]@]host[:port]/database`.
    ///
    /// The database part is appended verbatim so relative file paths keep
    /// their meaning.
    pub fn build(backend: &str, database: &str, credentials: &Credentials) -> Result<Self> {
        if is_file_backed(backend) {
            if !credentials.is_empty() {
                tracing::debug!("Ignoring credentials for file-backed backend '{}'", backend);
            }
            return Ok(Self::without_host(backend, database));
        }

        let Some(host) = credentials.host.as_deref() else {
            if !credentials.is_empty() {
                return Err(DatasetError::config(format!(
                    "credentials for backend '{}' set a username, password or port but no host",
                    backend
                )));
            }
            return Ok(Self::without_host(backend, database));
        };

        let invalid = |field: &str, value: &str, reason: &str| DatasetError::InvalidConfigValueError {
            field: format!("credentials.{}", field),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let mut url = Url::parse(&format!("{}://{}", backend, host))
            .map_err(|e| invalid("host", host, &e.to_string()))?;
        if let Some(port) = credentials.port {
            url.set_port(Some(port))
                .map_err(|_| invalid("port", &port.to_string(), "cannot set port"))?;
        }
        if let Some(username) = credentials.username.as_deref() {
            url.set_username(username)
                .map_err(|_| invalid("username", username, "cannot set username"))?;
        }

        let mut redacted = url.clone();
        if let Some(password) = credentials.password.as_deref() {
            url.set_password(Some(password))
                .map_err(|_| invalid("password", "***", "cannot set password"))?;
            redacted
                .set_password(Some("***"))
                .map_err(|_| invalid("password", "***", "cannot set password"))?;
        }

        let join = |base: &Url| format!("{}/{}", base.as_str().trim_end_matches('/'), database);
        Ok(Self {
            url: join(&url),
            redacted: join(&redacted),
        })
    }

    fn without_host(backend: &str, database: &str) -> Self {
        let url = format!("{}:///{}", backend, database);
        Self {
            redacted: url.clone(),
            url,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn redacted(&self) -> &str {
        &self.redacted
    }
}
