//! Recording transport for unit tests.

use std::io;
use std::sync::{Arc, Mutex};

use crate::http::{HttpRequest, HttpResponse, Transport};

/// Answers every request with one canned response (or one I/O error) and
/// keeps a copy of each request it saw. Clones share the recording.
#[derive(Debug, Clone)]
pub(crate) struct StubTransport {
    reply: Option<(u16, String)>,
    seen: Arc<Mutex<Vec<HttpRequest>>>,
}

impl StubTransport {
    pub(crate) fn replying(status: u16, body: &str) -> Self {
        Self {
            reply: Some((status, body.to_string())),
            seen: Arc::default(),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            seen: Arc::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

impl Transport for StubTransport {
    type Error = io::Error;

    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, io::Error> {
        self.seen.lock().unwrap().push(request.clone());
        match &self.reply {
            Some((status, body)) => Ok(HttpResponse {
                status: *status,
                headers: vec![("content-type".to_string(), "application/json".to_string())],
                body: body.clone(),
            }),
            None => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )),
        }
    }
}
