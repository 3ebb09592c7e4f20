//! Environment, network client, and the execution pipeline.
//!
//! # Design
//! `Network` is a cheap handle around an `Arc<Environment>`; clones share
//! the same read-only configuration, so concurrent `perform` calls need no
//! locking.
//!
//! `perform` drives one request through an explicit state machine:
//!
//! ```text
//! Dispatch -> Validate -> Decode
//!                |
//!                +-> Restore -> Retry -> Decode
//! ```
//!
//! `Retry` can only lead to `Decode`, so a call sends the request at most
//! twice and the second response is never validated again. The whole flow is
//! one future; dropping it drops whichever transport or restore future is in
//! flight.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use url::Url;

use crate::builder::RequestBuilder;
use crate::codec::{BodyEncoder, JsonDecoder, JsonEncoder, ResponseDecoder};
use crate::encoding::ParameterEncoding;
use crate::error::NetworkError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::IncompleteRequest;
use crate::retry::Retriers;
use crate::transport::Transport;

/// Immutable configuration owned by a `Network`.
pub struct Environment<E = JsonEncoder, D = JsonDecoder> {
    base_url: Url,
    transport: Arc<dyn Transport>,
    body_encoder: E,
    response_decoder: D,
    retriers: Option<Retriers>,
}

impl Environment {
    /// JSON codecs, no retriers.
    pub fn new(base_url: Url, transport: impl Transport + 'static) -> Self {
        Self {
            base_url,
            transport: Arc::new(transport),
            body_encoder: JsonEncoder::default(),
            response_decoder: JsonDecoder,
            retriers: None,
        }
    }
}

impl<E, D> Environment<E, D> {
    /// Swap the body encoder and response decoder.
    pub fn with_codecs<E2, D2>(self, body_encoder: E2, response_decoder: D2) -> Environment<E2, D2>
    where
        E2: BodyEncoder,
        D2: ResponseDecoder,
    {
        Environment {
            base_url: self.base_url,
            transport: self.transport,
            body_encoder,
            response_decoder,
            retriers: self.retriers,
        }
    }

    pub fn with_retriers(mut self, retriers: Retriers) -> Self {
        self.retriers = Some(retriers);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn body_encoder(&self) -> &E {
        &self.body_encoder
    }

    pub fn response_decoder(&self) -> &D {
        &self.response_decoder
    }

    pub fn retriers(&self) -> Option<&Retriers> {
        self.retriers.as_ref()
    }
}

impl<E, D> fmt::Debug for Environment<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("base_url", &self.base_url.as_str())
            .field("retriers", &self.retriers)
            .finish_non_exhaustive()
    }
}

/// Applied to every builder `Network::request` hands out, before the caller
/// sees it. Typical uses are default headers and API keys.
pub trait RequestModifier: Send + Sync {
    fn modify(&self, builder: RequestBuilder) -> RequestBuilder;
}

impl<F> RequestModifier for F
where
    F: Fn(RequestBuilder) -> RequestBuilder + Send + Sync,
{
    fn modify(&self, builder: RequestBuilder) -> RequestBuilder {
        self(builder)
    }
}

pub struct Network<E = JsonEncoder, D = JsonDecoder> {
    env: Arc<Environment<E, D>>,
    modifier: Option<Arc<dyn RequestModifier>>,
}

impl<E, D> Clone for Network<E, D> {
    fn clone(&self) -> Self {
        Self {
            env: Arc::clone(&self.env),
            modifier: self.modifier.clone(),
        }
    }
}

impl<E, D> fmt::Debug for Network<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("env", &self.env)
            .field("has_modifier", &self.modifier.is_some())
            .finish()
    }
}

enum Stage {
    Dispatch,
    Validate(HttpResponse),
    Restore,
    Retry,
    Decode(HttpResponse),
}

impl<E, D> Network<E, D>
where
    E: BodyEncoder,
    D: ResponseDecoder,
{
    pub fn new(env: Environment<E, D>) -> Self {
        Self {
            env: Arc::new(env),
            modifier: None,
        }
    }

    pub fn with_modifier(mut self, modifier: impl RequestModifier + 'static) -> Self {
        self.modifier = Some(Arc::new(modifier));
        self
    }

    pub fn env(&self) -> &Environment<E, D> {
        &self.env
    }

    /// Start a request for `path` under the base URL, with parameters sent
    /// in the query string.
    pub fn request<R>(&self, path: &str) -> IncompleteRequest<R, E, D> {
        self.request_with_encoding(path, ParameterEncoding::default())
    }

    pub fn request_with_encoding<R>(
        &self,
        path: &str,
        encoding: ParameterEncoding,
    ) -> IncompleteRequest<R, E, D> {
        let builder = self.modify(RequestBuilder::new(&self.env.base_url, path, encoding));
        IncompleteRequest {
            network: self.clone(),
            builder,
            response: PhantomData,
        }
    }

    fn modify(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.modifier {
            Some(modifier) => modifier.modify(builder),
            None => builder,
        }
    }

    /// Run a finalized request through dispatch, validation, the optional
    /// restore-and-retry cycle, and decoding.
    ///
    /// Returns `Ok(None)` when the validator rejects the response and no
    /// restorer is configured.
    pub async fn perform<R>(&self, request: HttpRequest) -> Result<Option<R>, NetworkError>
    where
        R: DeserializeOwned,
    {
        let mut stage = Stage::Dispatch;
        loop {
            stage = match stage {
                Stage::Dispatch => Stage::Validate(self.dispatch(&request).await?),
                Stage::Validate(response) => match &self.env.retriers {
                    Some(retriers) if !retriers.validator().is_valid(&response) => {
                        tracing::warn!(
                            status = response.status,
                            url = %request.url,
                            "response rejected by validator"
                        );
                        Stage::Restore
                    }
                    _ => Stage::Decode(response),
                },
                Stage::Restore => {
                    let Some(restorer) = self.env.retriers.as_ref().and_then(Retriers::restorer) else {
                        tracing::debug!(url = %request.url, "no restorer configured, nothing to deliver");
                        return Ok(None);
                    };
                    if let Err(err) = restorer.restore().await {
                        tracing::warn!(error = %err, "request restore failed");
                        return Err(NetworkError::RestoreFailed(err));
                    }
                    Stage::Retry
                }
                Stage::Retry => {
                    tracing::debug!(url = %request.url, "retrying after restore");
                    Stage::Decode(self.dispatch(&request).await?)
                }
                Stage::Decode(response) => {
                    let value = self.env.response_decoder.decode(&response.body)?;
                    return Ok(Some(value));
                }
            };
        }
    }

    async fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse, NetworkError> {
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");
        let response = self.env.transport.send(request).await?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }
}

impl HttpRequest {
    /// Run this request on `network`; see `Network::perform`.
    pub async fn perform_on<R, E, D>(self, network: &Network<E, D>) -> Result<Option<R>, NetworkError>
    where
        R: DeserializeOwned,
        E: BodyEncoder,
        D: ResponseDecoder,
    {
        network.perform(self).await
    }
}
