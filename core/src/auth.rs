//! Static bearer-token binding for a transport.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

/// Wraps a transport and adds `Authorization: Bearer <token>` to every
/// request. The token is never refreshed.
#[derive(Clone)]
pub struct BearerAuth<T> {
    inner: T,
    token: String,
}

impl<T: Transport> BearerAuth<T> {
    pub fn new(inner: T, token: impl Into<String>) -> Self {
        Self {
            inner,
            token: token.into(),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for BearerAuth<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth").field("token", &"[REDACTED]").finish_non_exhaustive()
    }
}

impl<T: Transport> Transport for BearerAuth<T> {
    fn execute(&self, request: &HttpRequest, deadline: Option<Duration>) -> Result<HttpResponse, TransportError> {
        let mut request = request.clone();
        request.headers.retain(|(k, _)| !k.eq_ignore_ascii_case("authorization"));
        request
            .headers
            .push(("Authorization".to_string(), format!("Bearer {}", self.token)));
        self.inner.execute(&request, deadline)
    }
}

/// A ready-to-use authenticated transport for a pre-minted OAuth2 access
/// token.
pub fn oauth2_transport(access_token: impl Into<String>) -> Arc<dyn Transport> {
    Arc::new(BearerAuth::new(UreqTransport::default(), access_token))
}
