//! Security policy middleware implementation.

use crate::{
    config::SecureConfig,
    policy::{Outcome, Policy, seed_headers},
};
use actix_web::{
    Error, HttpResponse, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{StatusCode, header::HeaderMap},
};
use std::{
    future::{Ready, ready},
    pin::Pin,
    sync::Arc,
};

/// Security policy middleware factory
///
/// Compiles the configuration once; every worker shares the same [`Policy`].
#[derive(Clone)]
pub struct SecureHeaders {
    policy: Arc<Policy>,
}

impl SecureHeaders {
    /// Create a new security policy middleware with the given configuration
    pub fn new(config: SecureConfig) -> Self {
        Self::from_policy(Arc::new(Policy::new(config)))
    }

    /// Wrap an already built policy
    pub fn from_policy(policy: Arc<Policy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &Arc<Policy> {
        &self.policy
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecureHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SecureHeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecureHeadersMiddleware {
            service,
            policy: Arc::clone(&self.policy),
        }))
    }
}

/// The actual security policy middleware service
///
/// Requests halted by the policy are answered here and never reach the
/// wrapped service.
pub struct SecureHeadersMiddleware<S> {
    service: S,
    policy: Arc<Policy>,
}

impl<S, B> Service<ServiceRequest> for SecureHeadersMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let mut written = HeaderMap::new();

        match self.policy.apply(req.request(), &mut written) {
            Outcome::Halted(response) => {
                let res = req.into_response(response).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
            Outcome::Continue => {
                let fut = self.service.call(req);

                Box::pin(async move {
                    let mut res = fut.await.map_err(|error| SecuredError {
                        error,
                        headers: written.clone(),
                    })?;
                    seed_headers(res.headers_mut(), &written);
                    Ok(res.map_into_left_body())
                })
            }
        }
    }
}

/// Error from the wrapped service, rendered with the security headers
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
struct SecuredError {
    error: Error,
    headers: HeaderMap,
}

impl ResponseError for SecuredError {
    fn status_code(&self) -> StatusCode {
        self.error.as_response_error().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = self.error.error_response();
        seed_headers(response.headers_mut(), &self.headers);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_policy() {
        let secure = SecureHeaders::new(SecureConfig {
            frame_deny: true,
            ..SecureConfig::default()
        });
        let clone = secure.clone();

        assert!(Arc::ptr_eq(secure.policy(), clone.policy()));
        assert_eq!(clone.policy().headers().len(), 1);
    }

    #[test]
    fn from_policy_keeps_the_given_policy() {
        let policy = Arc::new(Policy::new(SecureConfig::secure_defaults()));
        let secure = SecureHeaders::from_policy(Arc::clone(&policy));

        assert!(Arc::ptr_eq(secure.policy(), &policy));
        assert!(secure.policy().config().ssl_redirect);
    }
}
