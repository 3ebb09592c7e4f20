//! Immutable, chainable request builder.
//!
//! # Design
//! `RequestBuilder` is a consuming value type: every mutator takes `self`
//! and returns a new builder, so a snapshot that was cloned earlier is never
//! affected by later calls. No I/O happens here. `build` is the single point
//! where pending parameters are materialized, and it borrows the builder so
//! it can be called repeatedly with identical results.

use std::time::Duration;

use bytes::Bytes;
use url::Url;

use crate::encoding::{ParamValue, ParameterEncoding, Parameters};
use crate::http::{HttpMethod, HttpRequest};

/// One structural attribute of a request, set with replace semantics by
/// `RequestBuilder::set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestAttribute {
    Method(HttpMethod),
    Url(Url),
    Timeout(Option<Duration>),
    /// Replaces every existing value of the header.
    Header(String, String),
    Body(Option<Bytes>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestBuilder {
    request: HttpRequest,
    encoding: ParameterEncoding,
    params: Parameters,
}

impl RequestBuilder {
    /// Start a `GET` request for `base_url` joined with `path`.
    ///
    /// A cannot-be-a-base URL (`mailto:`, `data:`) has no path to extend:
    /// `path` is dropped with a warning and the request targets `base_url`.
    pub fn new(base_url: &Url, path: &str, encoding: ParameterEncoding) -> Self {
        Self::from_request(HttpRequest::new(join_path(base_url, path)), encoding)
    }

    /// Start from an existing request.
    pub fn from_request(request: HttpRequest, encoding: ParameterEncoding) -> Self {
        Self {
            request,
            encoding,
            params: Parameters::new(),
        }
    }

    #[must_use]
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.request.method = method;
        self
    }

    /// Add every header value, keeping existing values for the same names.
    #[must_use]
    pub fn headers<K, V, I>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in headers {
            self.request.add_header(key, value);
        }
        self
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.add_header(key, value);
        self
    }

    #[must_use]
    pub fn set(mut self, attribute: RequestAttribute) -> Self {
        match attribute {
            RequestAttribute::Method(method) => self.request.method = method,
            RequestAttribute::Url(url) => self.request.url = url,
            RequestAttribute::Timeout(timeout) => self.request.timeout = timeout,
            RequestAttribute::Header(key, value) => self.request.set_header(key, value),
            RequestAttribute::Body(body) => self.request.body = body,
        }
        self
    }

    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        self.set(RequestAttribute::Timeout(Some(timeout)))
    }

    /// Hand the request draft to `f` for changes no other mutator covers.
    /// Pending parameters are still applied on top at `build`.
    #[must_use]
    pub fn configure(mut self, f: impl FnOnce(&mut HttpRequest)) -> Self {
        f(&mut self.request);
        self
    }

    /// Queue a parameter. Ignored if `key` is already queued.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    #[must_use]
    pub fn params<K, V, I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.params.extend(params);
        self
    }

    /// Set raw body bytes, bypassing the parameter encoding.
    #[must_use]
    pub fn body(mut self, data: impl Into<Bytes>) -> Self {
        self.request.body = Some(data.into());
        self
    }

    pub fn encoding(&self) -> ParameterEncoding {
        self.encoding
    }

    pub fn pending_params(&self) -> &Parameters {
        &self.params
    }

    /// Finalize the request, merging pending parameters with the configured
    /// encoding.
    pub fn build(&self) -> HttpRequest {
        self.encoding.encode(self.request.clone(), &self.params)
    }
}

/// Append `path` to `base` as path segments. An empty path (or one made only
/// of slashes) yields `base` unchanged.
pub(crate) fn join_path(base: &Url, path: &str) -> Url {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return base.clone();
    }
    let mut url = base.clone();
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty().extend(path.split('/'));
        }
        Err(()) => {
            tracing::warn!(base = %base, path, "base URL cannot take a path, ignoring path");
        }
    }
    url
}
