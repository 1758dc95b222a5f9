//! Response classification and decoding.
//!
//! # Design
//! Classification is purely status based: 200-299 is success, everything
//! else becomes an [`ApiError`]. What happens to a successful body is chosen
//! by the caller through [`Target`]; nothing is inferred from the type being
//! decoded into.

use std::io::Write;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ApiError, DecodeStage, Error};
use crate::http::{HttpRequest, HttpResponse, ResponseMeta};

/// Where the body of a successful response goes.
pub enum Target<'a> {
    /// Parse the body as JSON.
    Decode,
    /// Copy the raw body into the sink without decoding it.
    Stream(&'a mut dyn Write),
}

/// A successful body after it went through its [`Target`].
#[derive(Debug, Clone, PartialEq)]
pub enum Body<T> {
    Decoded(T),
    /// Number of bytes copied into the sink.
    Streamed(u64),
    /// The response had no content (e.g. 204).
    Empty,
}

impl<T> Body<T> {
    pub fn into_decoded(self) -> Option<T> {
        match self {
            Body::Decoded(value) => Some(value),
            Body::Streamed(_) | Body::Empty => None,
        }
    }
}

/// A decoded value together with the metadata of the response it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    pub meta: ResponseMeta,
    pub data: T,
}

impl<T> Response<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            meta: self.meta,
            data: f(self.data),
        }
    }

    pub fn status(&self) -> u16 {
        self.meta.status
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    code: i64,
}

/// Turn a non-2xx response into an [`ApiError`]; pass 2xx through.
///
/// A missing or malformed error body only makes the error less detailed.
pub fn check_response(request: &HttpRequest, response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let body: ErrorBody = serde_json::from_slice(&response.body).unwrap_or_default();
    Err(ApiError::new(
        request.method,
        &request.url,
        body.code,
        body.error,
        response.meta(),
    ))
}

/// Route a successful response body into `target`.
pub fn deliver<T: DeserializeOwned>(response: HttpResponse, target: Target<'_>) -> Result<Response<Body<T>>, Error> {
    let meta = response.meta();
    match target {
        Target::Stream(sink) => match sink.write_all(&response.body).and_then(|()| sink.flush()) {
            Ok(()) => Ok(Response {
                meta,
                data: Body::Streamed(response.body.len() as u64),
            }),
            Err(source) => Err(Error::Stream { source, response: meta }),
        },
        Target::Decode => {
            if is_blank(&response.body) {
                return Ok(Response { meta, data: Body::Empty });
            }
            let value = decode(&response.body, DecodeStage::Body, &meta)?;
            Ok(Response {
                meta,
                data: Body::Decoded(value),
            })
        }
    }
}

/// Two-stage decode: the body into a generic field map, then `field` of
/// that map into `T`. A blank body is [`Body::Empty`].
pub fn decode_envelope<T: DeserializeOwned>(response: HttpResponse, field: &str) -> Result<Response<Body<T>>, Error> {
    let meta = response.meta();
    if is_blank(&response.body) {
        return Ok(Response { meta, data: Body::Empty });
    }
    let mut envelope: Map<String, Value> = decode(&response.body, DecodeStage::Envelope, &meta)?;
    let stage = DecodeStage::Field(field.to_string());
    let Some(value) = envelope.remove(field) else {
        let source = <serde_json::Error as serde::de::Error>::custom(format_args!("missing field `{field}`"));
        return Err(Error::decode(stage, source, meta));
    };
    match serde_json::from_value(value) {
        Ok(value) => Ok(Response {
            meta,
            data: Body::Decoded(value),
        }),
        Err(source) => Err(Error::decode(stage, source, meta)),
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8], stage: DecodeStage, meta: &ResponseMeta) -> Result<T, Error> {
    serde_json::from_slice(bytes).map_err(|source| Error::decode(stage, source, meta.clone()))
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}
