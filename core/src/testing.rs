//! Canned-response transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Replays queued responses in order and records what it was asked to send.
/// Once the queue is empty every call fails like a refused connection.
#[derive(Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<(HttpRequest, Option<Duration>)>>,
}

impl StubTransport {
    pub fn with_responses(responses: Vec<HttpResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::default(),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn deadlines(&self) -> Vec<Option<Duration>> {
        self.requests.lock().unwrap().iter().map(|(_, d)| *d).collect()
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: &HttpRequest, deadline: Option<Duration>) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push((request.clone(), deadline));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::new("connection refused"))
    }
}
