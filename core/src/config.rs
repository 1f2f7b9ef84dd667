//! Credential resolution for the Ilkbyte API.
//!
//! Every value may be passed explicitly or picked up from the environment
//! under the `ILKBYTE_` prefix. Resolution happens once, at construction;
//! a missing value is reported before any request can be made.

use std::fmt;

use tracing::error;

use crate::error::ConfigError;

pub const ENV_HOST: &str = "ILKBYTE_HOST";
pub const ENV_SECRET_KEY: &str = "ILKBYTE_SECRET_KEY";
pub const ENV_ACCESS_KEY: &str = "ILKBYTE_ACCESS_KEY";

/// Host URL and key pair used to authenticate every request.
///
/// Immutable once built. `Debug` output redacts both keys.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    host: String,
    secret_key: String,
    access_key: String,
}

impl Credentials {
    /// Build credentials from explicit values. Empty values are rejected.
    pub fn new(host: &str, secret_key: &str, access_key: &str) -> Result<Self, ConfigError> {
        Self::resolve_with(Some(host), Some(secret_key), Some(access_key), |_| None)
    }

    /// Read all three values from `ILKBYTE_HOST`, `ILKBYTE_SECRET_KEY` and
    /// `ILKBYTE_ACCESS_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(None, None, None)
    }

    /// Use each explicit value when given, otherwise fall back to its
    /// environment variable.
    pub fn resolve(
        host: Option<&str>,
        secret_key: Option<&str>,
        access_key: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Self::resolve_with(host, secret_key, access_key, |key| std::env::var(key).ok())
    }

    /// Like [`Credentials::resolve`], with `lookup` standing in for the
    /// process environment.
    ///
    /// Values are checked in order host, secret key, access key; the first
    /// missing one is reported. Empty strings count as missing, and so does a
    /// host made only of slashes.
    pub fn resolve_with<F>(
        host: Option<&str>,
        secret_key: Option<&str>,
        access_key: Option<&str>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = pick(host, "host", ENV_HOST, &lookup, trim_host)?;
        let secret_key = pick(secret_key, "secret_key", ENV_SECRET_KEY, &lookup, as_is)?;
        let access_key = pick(access_key, "access_key", ENV_ACCESS_KEY, &lookup, as_is)?;

        Ok(Self {
            host,
            secret_key,
            access_key,
        })
    }

    /// Base URL without a trailing slash.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("secret_key", &"<redacted>")
            .field("access_key", &"<redacted>")
            .finish()
    }
}

fn trim_host(value: &str) -> &str {
    value.trim_end_matches('/')
}

fn as_is(value: &str) -> &str {
    value
}

/// First non-empty value after `normalize`, explicit before environment.
fn pick<F>(
    explicit: Option<&str>,
    field: &'static str,
    env_var: &'static str,
    lookup: &F,
    normalize: fn(&str) -> &str,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = explicit.map(normalize).filter(|v| !v.is_empty()) {
        return Ok(value.to_string());
    }
    match lookup(env_var).as_deref().map(normalize).filter(|v| !v.is_empty()) {
        Some(value) => Ok(value.to_string()),
        None => {
            error!("{field} argument or {env_var} environment variable is required");
            Err(ConfigError::Missing { field, env_var })
        }
    }
}
