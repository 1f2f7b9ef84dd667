//! HTTP transport types and the blocking `ureq` transport.
//!
//! # Design
//! Requests and responses are plain data. The session builds an
//! `HttpRequest`, a `Transport` executes it, and the facade interprets the
//! resulting `HttpResponse`. Tests swap in a recording transport; production
//! code uses `UreqTransport`.

use std::fmt;

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL without the query string.
    pub url: String,
    /// Query parameters, already encoded to wire strings.
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// First query value stored under `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes `HttpRequest`s.
///
/// Implementations must hand back every HTTP status as a response. `Error`
/// is reserved for failures where no response exists (DNS, refused
/// connection, TLS, timeouts) and reaches callers unchanged.
pub trait Transport {
    type Error: std::error::Error + Send + Sync + 'static;

    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, Self::Error>;
}

/// Blocking transport backed by a `ureq::Agent`.
///
/// Uses the agent defaults apart from status handling: redirects are
/// followed (up to 10), there is no request timeout, and TLS comes from
/// ureq's default provider. The agent is cheap to clone and safe to share
/// between threads.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap a caller-configured agent, e.g. one with timeouts or a proxy.
    /// The agent should keep `http_status_as_error(false)` so API errors
    /// carry their body.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    type Error = ureq::Error;

    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ureq::Error> {
        let mut builder = self.agent.get(request.url.as_str());
        for (key, value) in &request.query {
            builder = builder.query(key.as_str(), value.as_str());
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call()?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    #[test]
    fn success_covers_2xx_only() {
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(199).is_success());
        assert!(!response(301).is_success());
        assert!(!response(404).is_success());
        assert!(!response(500).is_success());
    }

    #[test]
    fn query_value_finds_first_match() {
        let req = HttpRequest {
            url: "http://h/account".to_string(),
            query: vec![
                ("access".to_string(), "a".to_string()),
                ("secret".to_string(), "s".to_string()),
            ],
            headers: Vec::new(),
        };
        assert_eq!(req.query_value("secret"), Some("s"));
        assert_eq!(req.query_value("missing"), None);
    }

    #[test]
    fn ureq_transport_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<UreqTransport>();
    }
}
