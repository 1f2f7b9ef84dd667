//! Error types for the Ilkbyte API client.
//!
//! # Design
//! Configuration problems are reported by constructors as `ConfigError`, so
//! a client that exists is always fully configured. Per-call failures use
//! `Error<E>`, where `E` is the transport's own error type: transport
//! failures are handed back unchanged rather than flattened into a string.

use serde_json::Value;
use thiserror::Error;

/// A required setting was neither passed explicitly nor found in the
/// environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {field} (pass it explicitly or set {env_var})")]
    Missing {
        /// Programmatic name of the missing value.
        field: &'static str,
        /// Environment variable consulted as a fallback.
        env_var: &'static str,
    },
}

/// Body of a failed API response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The body parsed as JSON.
    Json(Value),
    /// The body was not valid JSON and is kept verbatim.
    Raw(String),
}

impl ResponseBody {
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Raw(raw.to_string()),
        }
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{value}"),
            ResponseBody::Raw(raw) => f.write_str(raw),
        }
    }
}

/// Errors returned by `Ilkbyte` operations.
#[derive(Error, Debug)]
pub enum Error<E>
where
    E: std::error::Error + 'static,
{
    /// The server answered with a non-2xx status.
    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: ResponseBody },

    /// A 2xx response body could not be parsed as JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(E),
}

impl<E> Error<E>
where
    E: std::error::Error + 'static,
{
    /// HTTP status of an API error, `None` for decode and transport errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
