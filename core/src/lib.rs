//! Synchronous client for the Buffer social media scheduling API.
//!
//! # Overview
//! A [`Client`] owns the base URL, the user agent and a caller-supplied
//! [`Transport`] that already carries the access token. Resource services
//! (`users()`, `profiles()`, `updates()`) translate typed calls into
//! [`HttpRequest`]s, and every call goes through the same pipeline: build,
//! dispatch, classify by status, decode.
//!
//! # Design
//! - `Client` is immutable after construction and `Send + Sync`; services
//!   borrow it and keep no state of their own.
//! - Non-2xx responses are returned as [`ApiError`] with the request URL
//!   sanitized, never as a transport failure.
//! - The caller chooses how a body is consumed ([`Target`]), and list
//!   options are encoded from declarative [`Param`] tables.
//!
//! ```no_run
//! use buffer_core::{auth, Client, UpdateListOptions};
//!
//! let client = Client::new(Some(auth::oauth2_transport("1/access-token")));
//! let user = client.users().get()?.data;
//! let opts = UpdateListOptions { count: 10, ..Default::default() };
//! let pending = client.updates().pending("profile-id", Some(&opts))?.data;
//! println!("{} has {} pending updates", user.id, pending.total);
//! # Ok::<(), buffer_core::Error>(())
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod options;
pub mod pipeline;
pub mod profile;
pub mod sanitize;
pub mod transport;
pub mod types;
pub mod update;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{Client, ClientBuilder, CONTENT_TYPE, DEFAULT_BASE_URL, USER_AGENT};
pub use error::{ApiError, DecodeStage, EncodeError, Error, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ResponseMeta};
pub use options::{add_options, Param, ParamValue, QueryOptions};
pub use pipeline::{Body, Response, Target};
pub use profile::ProfileService;
pub use transport::{Transport, UreqTransport};
pub use types::{
    Interaction, InteractionList, InteractionListOptions, InteractionUser, Media, Profile, Schedule, Statistics,
    Update, UpdateCreateOptions, UpdateEditOptions, UpdateList, UpdateListOptions, UpdateReorderOptions,
    UpdateShuffleOptions, UpdateStats, User,
};
pub use update::UpdateService;
pub use user::UserService;
