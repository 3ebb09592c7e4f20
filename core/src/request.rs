//! A request bound to a network and an expected response type.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::builder::{RequestAttribute, RequestBuilder};
use crate::codec::{BodyEncoder, JsonDecoder, JsonEncoder, ResponseDecoder};
use crate::encoding::ParamValue;
use crate::error::{EncodeError, NetworkError};
use crate::http::{HttpMethod, HttpRequest};
use crate::network::Network;

/// Pairs a `RequestBuilder` with the `Network` that will run it.
///
/// Mirrors every builder mutator, so a call chain reads top to bottom and
/// ends in `perform`:
///
/// ```no_run
/// # use netkit::{Environment, HttpMethod, Network, UreqTransport};
/// # use serde::Deserialize;
/// # #[derive(Deserialize)] struct User { name: String }
/// # async fn run() -> Result<(), netkit::NetworkError> {
/// let base = url::Url::parse("https://api.example.com/").unwrap();
/// let network = Network::new(Environment::new(base, UreqTransport::new()));
/// let user: Option<User> = network
///     .request("users/42")
///     .method(HttpMethod::Get)
///     .header("Accept", "application/json")
///     .param("fields", "name")
///     .perform()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct IncompleteRequest<R, E = JsonEncoder, D = JsonDecoder> {
    pub(crate) network: Network<E, D>,
    pub(crate) builder: RequestBuilder,
    pub(crate) response: PhantomData<fn() -> R>,
}

impl<R, E, D> Clone for IncompleteRequest<R, E, D> {
    fn clone(&self) -> Self {
        Self {
            network: self.network.clone(),
            builder: self.builder.clone(),
            response: PhantomData,
        }
    }
}

impl<R, E, D> fmt::Debug for IncompleteRequest<R, E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncompleteRequest")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl<R, E, D> IncompleteRequest<R, E, D>
where
    E: BodyEncoder,
    D: ResponseDecoder,
{
    fn map(self, f: impl FnOnce(RequestBuilder) -> RequestBuilder) -> Self {
        Self {
            network: self.network,
            builder: f(self.builder),
            response: PhantomData,
        }
    }

    #[must_use]
    pub fn method(self, method: HttpMethod) -> Self {
        self.map(|b| b.method(method))
    }

    #[must_use]
    pub fn headers<K, V, I>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.map(|b| b.headers(headers))
    }

    #[must_use]
    pub fn header(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.map(|b| b.header(key, value))
    }

    #[must_use]
    pub fn set(self, attribute: RequestAttribute) -> Self {
        self.map(|b| b.set(attribute))
    }

    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        self.map(|b| b.timeout(timeout))
    }

    #[must_use]
    pub fn configure(self, f: impl FnOnce(&mut HttpRequest)) -> Self {
        self.map(|b| b.configure(f))
    }

    #[must_use]
    pub fn param(self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.map(|b| b.param(key, value))
    }

    #[must_use]
    pub fn params<K, V, I>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.map(|b| b.params(params))
    }

    #[must_use]
    pub fn body(self, data: impl Into<Bytes>) -> Self {
        self.map(|b| b.body(data))
    }

    /// Serialize `value` with the environment's body encoder and use the
    /// bytes as the body. Fails before anything is sent.
    pub fn encode_body<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, EncodeError> {
        let data = self.network.env().body_encoder().encode(value)?;
        Ok(self.body(data))
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    pub fn build(&self) -> HttpRequest {
        self.builder.build()
    }
}

impl<R, E, D> IncompleteRequest<R, E, D>
where
    R: DeserializeOwned,
    E: BodyEncoder,
    D: ResponseDecoder,
{
    /// Build the request and run it; see `Network::perform`.
    pub async fn perform(self) -> Result<Option<R>, NetworkError> {
        let request = self.builder.build();
        self.network.perform(request).await
    }
}
