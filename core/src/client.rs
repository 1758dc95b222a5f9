//! The composition root: base URL, user agent, transport and the request
//! pipeline every resource service goes through.
//!
//! # Design
//! `Client` is immutable after construction. Resource services are thin
//! facades that borrow it, so they can never outlive it, and they never
//! build requests or normalize errors on their own: everything goes through
//! [`Client::new_request`] and [`Client::execute`] (or its `send*` wrappers).

use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{EncodeError, Error};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::pipeline::{self, Body, Response, Target};
use crate::profile::ProfileService;
use crate::sanitize::sanitize_url;
use crate::transport::{Transport, UreqTransport};
use crate::update::UpdateService;
use crate::user::UserService;

pub const DEFAULT_BASE_URL: &str = "https://api.bufferapp.com/1/";
pub const USER_AGENT: &str = concat!("buffer-rs/", env!("CARGO_PKG_VERSION"));

/// Declared for every request, JSON body or not; the API expects it.
pub const CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Placeholder body argument for requests without a payload.
pub(crate) const NO_BODY: Option<&()> = None;

/// Client for the Buffer API.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: Url,
    user_agent: String,
    timeout: Option<Duration>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client bound to `transport`, or to an unauthenticated
    /// [`UreqTransport`] when `None`. Use [`oauth2_transport`] for a
    /// transport carrying an access token.
    ///
    /// [`oauth2_transport`]: crate::auth::oauth2_transport
    pub fn new(transport: Option<Arc<dyn Transport>>) -> Self {
        let transport = transport.unwrap_or_else(|| Arc::new(UreqTransport::default()));
        Self {
            transport,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is an absolute URL"),
            user_agent: USER_AGENT.to_string(),
            timeout: None,
        }
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn users(&self) -> UserService<'_> {
        UserService::new(self)
    }

    pub fn profiles(&self) -> ProfileService<'_> {
        ProfileService::new(self)
    }

    pub fn updates(&self) -> UpdateService<'_> {
        UpdateService::new(self)
    }

    /// Build a request for `path`, resolved against the base URL.
    ///
    /// `path` must be relative and must not start with `/`. A present `body`
    /// is JSON encoded. No I/O happens here.
    pub fn new_request<B>(&self, method: HttpMethod, path: &str, body: Option<&B>) -> Result<HttpRequest, Error>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path)?;

        let body = match body {
            Some(body) => Some(serde_json::to_string(body).map_err(EncodeError::from)?),
            None => None,
        };

        let mut headers = Vec::with_capacity(2);
        if !self.user_agent.is_empty() {
            headers.push(("User-Agent".to_string(), self.user_agent.clone()));
        }
        headers.push(("Content-Type".to_string(), CONTENT_TYPE.to_string()));

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    fn resolve(&self, path: &str) -> Result<Url, Error> {
        let invalid = |reason: &str| Error::InvalidPath {
            path: sanitize_url(path),
            reason: reason.to_string(),
        };

        if path.starts_with('/') {
            return Err(invalid("relative paths must not start with '/'"));
        }
        if Url::parse(path).is_ok() {
            return Err(invalid("absolute URLs are not accepted"));
        }
        let url = self.base_url.join(path).map_err(|e| invalid(&e.to_string()))?;
        if url.origin() != self.base_url.origin() || !url.path().starts_with(self.base_url.path()) {
            return Err(invalid("path escapes the base URL"));
        }
        Ok(url)
    }

    /// Dispatch `request` and route a successful body into `target`.
    ///
    /// `deadline` bounds the transport call; `None` falls back to the
    /// client's default timeout. Non-2xx responses become [`Error::Api`].
    pub fn execute<T: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        target: Target<'_>,
        deadline: Option<Duration>,
    ) -> Result<Response<Body<T>>, Error> {
        let response = self.dispatch(request, deadline)?;
        pipeline::deliver(response, target)
    }

    /// Dispatch `request` and decode its JSON body into `T`. A 2xx response
    /// without content (e.g. 204) succeeds with `T::default()`; check
    /// [`Response::status`] to tell it apart from a decoded value.
    pub fn send<T: DeserializeOwned + Default>(&self, request: &HttpRequest) -> Result<Response<T>, Error> {
        let response = self.execute::<T>(request, Target::Decode, None)?;
        Ok(response.map(|body| body.into_decoded().unwrap_or_default()))
    }

    /// Dispatch `request` and copy the raw body into `sink`; returns the
    /// number of bytes written.
    pub fn stream(&self, request: &HttpRequest, sink: &mut dyn Write) -> Result<Response<u64>, Error> {
        let response = self.execute::<serde_json::Value>(request, Target::Stream(sink), None)?;
        Ok(response.map(|body| match body {
            Body::Streamed(n) => n,
            Body::Decoded(_) | Body::Empty => 0,
        }))
    }

    /// Dispatch `request`, decode the body as a field map, then decode
    /// `field` of that map into `T`. A 2xx response without content yields
    /// [`Body::Empty`].
    pub fn send_enveloped<T: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        field: &str,
    ) -> Result<Response<Body<T>>, Error> {
        let response = self.dispatch(request, None)?;
        pipeline::decode_envelope(response, field)
    }

    fn dispatch(&self, request: &HttpRequest, deadline: Option<Duration>) -> Result<HttpResponse, Error> {
        let url = sanitize_url(&request.url);
        debug!(method = %request.method, url = %url, "sending request");

        let response = self.transport.execute(request, deadline.or(self.timeout))?;
        debug!(method = %request.method, url = %url, status = response.status, "received response");

        if let Err(err) = pipeline::check_response(request, &response) {
            warn!(
                method = %err.method,
                url = %err.url(),
                status = err.status,
                code = err.code,
                "request rejected by API"
            );
            return Err(err.into());
        }
        Ok(response)
    }
}

/// Percent-encode `id` for use as exactly one path segment.
pub(crate) fn path_segment(id: &str) -> Result<String, Error> {
    if id.is_empty() || id.chars().all(|c| c == '.') {
        return Err(Error::InvalidPath {
            path: id.to_string(),
            reason: "identifier is not a valid path segment".to_string(),
        });
    }
    // byte_serialize emits '+' only for spaces; a literal '+' becomes %2B.
    Ok(url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20"))
}

/// Configuration for a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Override the API root, e.g. to point at a mock server. A trailing `/`
    /// is added when missing so relative paths resolve beneath it.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// An empty user agent suppresses the header.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Default deadline for calls made without an explicit one.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let mut client = Client::new(self.transport);

        if let Some(raw) = self.base_url {
            let normalized = if raw.ends_with('/') { raw } else { format!("{raw}/") };
            let url = Url::parse(&normalized).map_err(|e| Error::InvalidPath {
                path: normalized.clone(),
                reason: e.to_string(),
            })?;
            if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
                return Err(Error::InvalidPath {
                    path: normalized,
                    reason: "base URL must be an absolute http(s) URL".to_string(),
                });
            }
            client.base_url = url;
        }
        if let Some(agent) = self.user_agent {
            client.user_agent = agent;
        }
        client.timeout = self.timeout;

        Ok(client)
    }
}
