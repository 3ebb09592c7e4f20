//! Parameter values, the pending parameter set, and the strategy that
//! materializes parameters into a request.
//!
//! # Design
//! `Parameters` keeps insertion order so encoded output is deterministic and
//! tests can assert exact strings. Keys are unique and the first insertion
//! wins: later writes of the same key are ignored.
//!
//! `ParameterEncoding` only runs from `RequestBuilder::build`; nothing else
//! turns parameters into URL or body bytes.

use std::fmt;

use bytes::Bytes;
use url::form_urlencoded;

use crate::http::HttpRequest;

/// Content type set by the body destination.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// A loosely typed parameter value, encoded via its natural text form.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::UInt(n) => write!(f, "{n}"),
            ParamValue::Float(n) => write!(f, "{n}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Str(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(f64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                ParamValue::Int(i64::from(value))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                ParamValue::UInt(u64::from(value))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::UInt(value as u64)
    }
}

impl From<isize> for ParamValue {
    fn from(value: isize) -> Self {
        ParamValue::Int(value as i64)
    }
}

/// Insertion-ordered parameter set with first-write-wins keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, ParamValue)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key` unless it is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        if self.contains_key(&key) {
            return;
        }
        self.entries.push((key, value.into()));
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == key)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K, V> Extend<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        params.extend(iter);
        params
    }
}

/// Where `ParameterEncoding` puts parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    #[default]
    QueryString,
    HttpBody,
}

/// Strategy that merges parameters into a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParameterEncoding {
    destination: Destination,
}

impl ParameterEncoding {
    pub fn new(destination: Destination) -> Self {
        Self { destination }
    }

    /// Parameters appended to the URL query.
    pub fn query_string() -> Self {
        Self::new(Destination::QueryString)
    }

    /// Parameters sent as a form-urlencoded body.
    pub fn http_body() -> Self {
        Self::new(Destination::HttpBody)
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// Return `request` with `params` merged in. An empty set is a no-op.
    pub fn encode(&self, mut request: HttpRequest, params: &Parameters) -> HttpRequest {
        if params.is_empty() {
            return request;
        }
        match self.destination {
            Destination::QueryString => {
                // The serializer writes back into the URL when dropped.
                let mut query = request.url.query_pairs_mut();
                for (key, value) in params.iter() {
                    query.append_pair(key, &value.to_string());
                }
            }
            Destination::HttpBody => {
                let body = form_body(params);
                request.set_header("Content-Type", FORM_CONTENT_TYPE);
                request.body = Some(Bytes::from(body));
            }
        }
        request
    }
}

fn form_body(params: &Parameters) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params.iter() {
        serializer.append_pair(key, &value.to_string());
    }
    serializer.finish()
}
