//! The transport binding the client dispatches requests through.
//!
//! # Design
//! The client never talks to the network itself. It hands each
//! [`HttpRequest`] to a [`Transport`], which returns an [`HttpResponse`] for
//! any status the server answered with, or a [`TransportError`] when no
//! response arrived. Authentication, pooling and TLS are the transport's
//! business; see [`crate::auth`] for the bearer-token wrapper.

use std::time::Duration;

use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes HTTP requests on behalf of a [`Client`](crate::Client).
///
/// Implementations must return non-2xx responses as data, not as errors;
/// status classification belongs to the client.
pub trait Transport: Send + Sync {
    /// Perform one round-trip. `deadline` bounds the whole call when set.
    fn execute(&self, request: &HttpRequest, deadline: Option<Duration>) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn execute(&self, request: &HttpRequest, deadline: Option<Duration>) -> Result<HttpResponse, TransportError> {
        (**self).execute(request, deadline)
    }
}

/// Blocking transport backed by a [`ureq::Agent`].
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    /// A transport whose agent applies `timeout` to every call that has no
    /// explicit deadline.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Some(Duration::from_secs(30)))
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest, deadline: Option<Duration>) -> Result<HttpResponse, TransportError> {
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                if deadline.is_some() {
                    builder = builder.config().timeout_global(deadline).build();
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                if deadline.is_some() {
                    builder = builder.config().timeout_global(deadline).build();
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(transport_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();
        let body = response.body_mut().read_to_vec().map_err(transport_error)?;
        debug!(status, bytes = body.len(), "ureq transport received response");

        Ok(HttpResponse { status, headers, body })
    }
}

fn transport_error(err: ureq::Error) -> TransportError {
    let message = err.to_string();
    match err {
        ureq::Error::Timeout(_) => TransportError::timeout(message).with_source(err),
        other => TransportError::new(message).with_source(other),
    }
}
