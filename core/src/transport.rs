//! The transport seam and the ureq-backed implementation.
//!
//! # Design
//! The pipeline only needs "send this request, give me a response". Any
//! status code is a successful exchange at this level; `TransportError` is
//! reserved for exchanges that did not complete. Implementations must accept
//! the same request more than once, since the pipeline re-sends it after a
//! restore.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::{UreqTransport, DEFAULT_TIMEOUT};

#[cfg(feature = "ureq")]
mod ureq_transport {
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;
    use ureq::http;

    use super::Transport;
    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};

    /// Timeout applied when neither the request nor the caller sets one.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Blocking ureq calls run on tokio's blocking pool.
    ///
    /// Dropping the `send` future stops waiting for the call, but ureq cannot
    /// interrupt a blocking exchange: the connection and the pool thread stay
    /// busy until the server answers or the timeout fires, at which point the
    /// connection is closed. Every exchange is therefore bounded by a timeout,
    /// `DEFAULT_TIMEOUT` unless configured otherwise.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
        default_timeout: Duration,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::with_default_timeout(DEFAULT_TIMEOUT)
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Timeout for requests that do not carry their own.
        ///
        /// Disables ureq's status-code-as-error behavior so 4xx/5xx
        /// responses come back as data for the validator to judge.
        pub fn with_default_timeout(timeout: Duration) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .new_agent();
            Self {
                agent,
                default_timeout: timeout,
            }
        }

        pub fn default_timeout(&self) -> Duration {
            self.default_timeout
        }
    }

    #[async_trait]
    impl Transport for UreqTransport {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let agent = self.agent.clone();
            let request = request.clone();
            tokio::task::spawn_blocking(move || execute(&agent, request))
                .await
                .map_err(TransportError::new)?
        }
    }

    fn execute(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let body = request.body.map(|b| b.to_vec()).unwrap_or_default();
        let mut http_request = builder.body(body).map_err(TransportError::new)?;
        if let Some(timeout) = request.timeout {
            http_request = agent
                .configure_request(http_request)
                .timeout_global(Some(timeout))
                .build();
        }

        let mut response = agent.run(http_request).map_err(TransportError::new)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_vec().map_err(TransportError::new)?;

        Ok(HttpResponse {
            status,
            headers,
            body: Bytes::from(body),
        })
    }
}
