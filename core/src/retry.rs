//! Response validation and request restoration policies.
//!
//! A `ResponseValidator` decides whether a response can be delivered. When
//! it says no, the pipeline runs the `RequestRestorer` once (refresh a token,
//! re-open a session) and re-sends the original request a single time.
//! Restorers that may be triggered by several in-flight requests at once are
//! responsible for coalescing those calls themselves.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::http::HttpResponse;

pub trait ResponseValidator: Send + Sync {
    fn is_valid(&self, response: &HttpResponse) -> bool;
}

impl<F> ResponseValidator for F
where
    F: Fn(&HttpResponse) -> bool + Send + Sync,
{
    fn is_valid(&self, response: &HttpResponse) -> bool {
        self(response)
    }
}

#[async_trait]
pub trait RequestRestorer: Send + Sync {
    async fn restore(&self) -> Result<(), BoxError>;
}

#[async_trait]
impl<T> RequestRestorer for Arc<T>
where
    T: RequestRestorer + ?Sized,
{
    async fn restore(&self) -> Result<(), BoxError> {
        (**self).restore().await
    }
}

/// Rejects responses whose status is in a fixed list, typically `401`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusValidator {
    rejected: Vec<u16>,
}

impl StatusValidator {
    pub fn rejecting(statuses: impl IntoIterator<Item = u16>) -> Self {
        Self {
            rejected: statuses.into_iter().collect(),
        }
    }

    /// Rejects `401 Unauthorized`.
    pub fn unauthorized() -> Self {
        Self::rejecting([401])
    }
}

impl ResponseValidator for StatusValidator {
    fn is_valid(&self, response: &HttpResponse) -> bool {
        !self.rejected.contains(&response.status)
    }
}

/// Validator plus optional restorer, configured once on the `Environment`.
///
/// With a validator but no restorer, a rejected response ends the call with
/// no value and no error.
#[derive(Clone)]
pub struct Retriers {
    validator: Arc<dyn ResponseValidator>,
    restorer: Option<Arc<dyn RequestRestorer>>,
}

impl Retriers {
    pub fn new(
        validator: impl ResponseValidator + 'static,
        restorer: impl RequestRestorer + 'static,
    ) -> Self {
        Self {
            validator: Arc::new(validator),
            restorer: Some(Arc::new(restorer)),
        }
    }

    pub fn validate_only(validator: impl ResponseValidator + 'static) -> Self {
        Self {
            validator: Arc::new(validator),
            restorer: None,
        }
    }

    pub fn validator(&self) -> &dyn ResponseValidator {
        self.validator.as_ref()
    }

    pub fn restorer(&self) -> Option<&dyn RequestRestorer> {
        self.restorer.as_deref()
    }
}

impl fmt::Debug for Retriers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retriers")
            .field("has_restorer", &self.restorer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_validator_rejects_listed_codes() {
        let validator = StatusValidator::rejecting([401, 403]);
        assert!(validator.is_valid(&HttpResponse::new(200, "")));
        assert!(validator.is_valid(&HttpResponse::new(500, "")));
        assert!(!validator.is_valid(&HttpResponse::new(403, "")));
        assert!(!StatusValidator::unauthorized().is_valid(&HttpResponse::new(401, "")));
    }

    #[test]
    fn closures_are_validators() {
        let retriers = Retriers::validate_only(|r: &HttpResponse| r.is_success());
        assert!(retriers.validator().is_valid(&HttpResponse::new(201, "")));
        assert!(!retriers.validator().is_valid(&HttpResponse::new(302, "")));
        assert!(retriers.restorer().is_none());
    }
}
