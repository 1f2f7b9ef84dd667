//! Authenticated request layer.
//!
//! # Design
//! `Session` owns the credentials and the transport and carries no
//! per-request state, so a shared reference can issue requests from many
//! threads at once. It never looks at response statuses; that is the
//! facade's job.

use tracing::debug;

use crate::config::Credentials;
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::params::Params;

/// Query key carrying the secret key on every request.
pub const SECRET_PARAM: &str = "secret";
/// Query key carrying the access key on every request.
pub const ACCESS_PARAM: &str = "access";

pub const USER_AGENT: &str = "ilkbyte-rust-client";

/// Headers attached to every request issued through a session.
pub const DEFAULT_HEADERS: [(&str, &str); 3] = [
    ("Accept-Charset", "utf-8"),
    ("Content-Type", "application/json"),
    ("User-Agent", USER_AGENT),
];

/// Attaches the key pair and default headers to every resource fetch.
#[derive(Debug, Clone)]
pub struct Session<T = UreqTransport> {
    credentials: Credentials,
    transport: T,
}

impl<T: Transport> Session<T> {
    pub fn new(credentials: Credentials, transport: T) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build the request for `{host}/{resource}`.
    ///
    /// `secret` and `access` are inserted after the caller's params and
    /// replace any caller-supplied value under the same key. `resource` is
    /// used verbatim.
    pub fn build_request(&self, resource: &str, mut params: Params) -> HttpRequest {
        params.insert(SECRET_PARAM, self.credentials.secret_key());
        params.insert(ACCESS_PARAM, self.credentials.access_key());

        HttpRequest {
            url: format!("{}/{}", self.credentials.host(), resource),
            query: params.to_query(),
            headers: DEFAULT_HEADERS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Issue an authenticated GET for `resource` and return the raw response,
    /// whatever its status. Pass `Params::new()` when there are no caller
    /// params.
    ///
    /// Only parameter names are logged, and only the caller's; key values
    /// never reach the log.
    pub fn get_resource(&self, resource: &str, params: Params) -> Result<HttpResponse, T::Error> {
        debug!(
            resource,
            params = ?params.keys().collect::<Vec<_>>(),
            "GET ilkbyte resource"
        );
        let request = self.build_request(resource, params);
        let response = self.transport.execute(&request)?;
        debug!(resource, status = response.status, "ilkbyte response");
        Ok(response)
    }
}
