//! Request building and execution for HTTP APIs.
//!
//! # Overview
//! Callers assemble a request with an immutable, chainable builder, then run
//! it through a `Network`: the request is sent over a pluggable `Transport`,
//! the response is checked by an optional `ResponseValidator`, and a rejected
//! response triggers one `RequestRestorer` run followed by a single retry.
//! The final body is decoded into the caller's type.
//!
//! # Design
//! - `RequestBuilder` does no I/O; `build` is the only place parameters are
//!   merged into the URL or body.
//! - `Network` and its `Environment` are read-only after construction and
//!   can be shared across concurrent calls.
//! - `perform` is a small state machine in one future. At most one restore
//!   and one retry happen per call.
//! - A rejected response with no restorer yields `Ok(None)`, distinct from
//!   every error.

pub mod builder;
pub mod codec;
pub mod encoding;
pub mod error;
pub mod http;
pub mod network;
pub mod request;
pub mod retry;
pub mod transport;

pub use builder::{RequestAttribute, RequestBuilder};
pub use codec::{BodyEncoder, JsonDecoder, JsonEncoder, ResponseDecoder};
pub use encoding::{Destination, ParamValue, ParameterEncoding, Parameters, FORM_CONTENT_TYPE};
pub use error::{BoxError, DecodeError, EncodeError, NetworkError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use network::{Environment, Network, RequestModifier};
pub use request::IncompleteRequest;
pub use retry::{RequestRestorer, ResponseValidator, Retriers, StatusValidator};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::{UreqTransport, DEFAULT_TIMEOUT};
