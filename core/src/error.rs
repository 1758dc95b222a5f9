//! Error types for the Buffer API client.
//!
//! # Design
//! Every fallible operation returns [`Error`]. A non-2xx response is not a
//! failure of the client but a structured outcome, so it gets its own
//! [`ApiError`] carrying the status, the service error code and message, and
//! a sanitized copy of the request URL. Errors raised after a response
//! arrived keep its [`ResponseMeta`] so callers can still look at headers.

use std::fmt;

use thiserror::Error;

use crate::http::{HttpMethod, ResponseMeta};
use crate::sanitize::sanitize_url;

/// Errors returned by the client and its resource services.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport failed before any response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request body or query options could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The relative path does not resolve inside the base URL.
    #[error("invalid request path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// The service answered with a status outside 200-299.
    #[error(transparent)]
    Api(Box<ApiError>),

    /// A 2xx response body did not have the expected shape.
    #[error("failed to decode response {stage}: {source}")]
    Decode {
        stage: DecodeStage,
        #[source]
        source: serde_json::Error,
        response: ResponseMeta,
    },

    /// Copying a 2xx response body into the caller's sink failed.
    #[error("failed to stream response body: {source}")]
    Stream {
        #[source]
        source: std::io::Error,
        response: ResponseMeta,
    },
}

impl Error {
    /// Metadata of the response that caused this error, if one was received.
    pub fn response(&self) -> Option<&ResponseMeta> {
        match self {
            Error::Api(err) => Some(&err.response),
            Error::Decode { response, .. } | Error::Stream { response, .. } => Some(response),
            Error::Transport(_) | Error::Encode(_) | Error::InvalidPath { .. } => None,
        }
    }

    /// The normalized API error, when the service rejected the request.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn decode(stage: DecodeStage, source: serde_json::Error, response: ResponseMeta) -> Self {
        Error::Decode {
            stage,
            source,
            response,
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(Box::new(err))
    }
}

/// A non-2xx response, normalized.
///
/// The URL is sanitized on construction: a non-empty `client_secret` query
/// value never survives into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub method: HttpMethod,
    url: String,
    pub status: u16,
    /// Service-specific error code; `0` when the body carried none.
    pub code: i64,
    /// Human-readable message; empty when the body carried none.
    pub message: String,
    pub response: ResponseMeta,
}

impl ApiError {
    pub fn new(
        method: HttpMethod,
        url: &str,
        code: i64,
        message: impl Into<String>,
        response: ResponseMeta,
    ) -> Self {
        Self {
            method,
            url: sanitize_url(url),
            status: response.status,
            code,
            message: message.into(),
            response,
        }
    }

    /// The request URL with secrets redacted.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error while processing {} request at {}: status {}, error code {}, error: {}",
            self.method, self.url, self.status, self.code, self.message
        )
    }
}

impl std::error::Error for ApiError {}

/// Which decode pass failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeStage {
    /// Parsing the whole body into the target type.
    Body,
    /// Parsing the body into a generic field map.
    Envelope,
    /// Re-decoding a named field of the envelope.
    Field(String),
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeStage::Body => f.write_str("body"),
            DecodeStage::Envelope => f.write_str("envelope"),
            DecodeStage::Field(name) => write!(f, "field {name:?}"),
        }
    }
}

/// Encoding failures that happen before any network activity.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize request body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("invalid query parameter name {0:?}")]
    ParamName(String),
}

/// A transport-level failure: connection refused, TLS, timeout and the like.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    timeout: bool,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: false,
            source: None,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            timeout: true,
            ..Self::new(message)
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn is_timeout(&self) -> bool {
        self.timeout
    }
}
