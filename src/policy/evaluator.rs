//! Per-request evaluation of the security policy.

use super::{
    headers::{CompiledHeaders, seed_headers},
    host::{is_ipv4, request_host},
    responder::{BadHostResponder, Forbidden},
};
use crate::config::SecureConfig;
use actix_web::{
    HttpRequest, HttpResponse,
    http::{
        StatusCode,
        header::{self, HeaderMap, HeaderValue},
    },
};

/// Result of evaluating a request
#[must_use]
#[derive(Debug)]
pub enum Outcome {
    /// The request may proceed to the next handler.
    Continue,
    /// The request was answered by the policy; the response is final.
    Halted(HttpResponse),
}

impl Outcome {
    pub fn is_continue(&self) -> bool {
        matches!(self, Outcome::Continue)
    }
}

/// Immutable security policy: the configuration plus its compiled headers
///
/// Safe to share between workers; evaluating a request never mutates it.
#[derive(Debug, Clone)]
pub struct Policy {
    config: SecureConfig,
    headers: CompiledHeaders,
}

impl Policy {
    pub fn new(config: SecureConfig) -> Self {
        let headers = CompiledHeaders::compile(&config);

        tracing::info!(
            target: "secure",
            headers = headers.len(),
            allowed_hosts = config.allowed_hosts.len(),
            ssl_redirect = config.ssl_redirect,
            development = config.is_development,
            "Security policy built"
        );

        Self { config, headers }
    }

    pub fn config(&self) -> &SecureConfig {
        &self.config
    }

    pub fn headers(&self) -> &CompiledHeaders {
        &self.headers
    }

    /// Evaluate `req`, writing the security headers into `headers`
    ///
    /// In development mode nothing is written and the request always
    /// continues. Otherwise the compiled headers are written first, then the
    /// host allow-list and the HTTPS requirement are checked in that order. A
    /// halted outcome carries the finished response, security headers
    /// included.
    pub fn apply(&self, req: &HttpRequest, headers: &mut HeaderMap) -> Outcome {
        if self.config.is_development {
            return Outcome::Continue;
        }

        self.headers.write_to(headers);

        if let Some(mut response) = self.check_allowed_hosts(req) {
            seed_headers(response.headers_mut(), headers);
            return Outcome::Halted(response);
        }

        if let Some(mut response) = self.check_ssl(req) {
            seed_headers(response.headers_mut(), headers);
            return Outcome::Halted(response);
        }

        Outcome::Continue
    }

    fn check_allowed_hosts(&self, req: &HttpRequest) -> Option<HttpResponse> {
        if self.config.allowed_hosts.is_empty() {
            return None;
        }

        let host = request_host(req);
        if self
            .config
            .allowed_hosts
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(host))
        {
            return None;
        }

        tracing::warn!(
            target: "secure",
            host = %host,
            allowed_hosts = self.config.allowed_hosts.len(),
            custom_handler = self.config.bad_host_handler.is_some(),
            "Rejected request for a host that is not allowed"
        );

        let response = match &self.config.bad_host_handler {
            Some(responder) => responder.respond(req),
            None => Forbidden.respond(req),
        };
        Some(response)
    }

    /// Whether the request is known to have arrived over TLS
    pub fn is_ssl_request(&self, req: &HttpRequest) -> bool {
        let secure_scheme = req
            .uri()
            .scheme_str()
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https"));
        if secure_scheme || req.app_config().secure() {
            return true;
        }

        for (name, expected) in &self.config.ssl_proxy_headers {
            let Some(value) = req.headers().get(name.as_str()) else {
                continue;
            };
            if std::str::from_utf8(value.as_bytes())
                .is_ok_and(|value| value.eq_ignore_ascii_case(expected))
            {
                tracing::debug!(
                    target: "secure",
                    header = %name,
                    "Trusting proxy header as proof of TLS"
                );
                return true;
            }
        }

        self.config.dont_redirect_ipv4_hostnames && is_ipv4(request_host(req))
    }

    fn check_ssl(&self, req: &HttpRequest) -> Option<HttpResponse> {
        if !self.config.ssl_redirect || self.is_ssl_request(req) {
            return None;
        }

        let original_host = request_host(req);
        let host = self.config.ssl_host().unwrap_or(original_host);
        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let location = format!("https://{host}{path_and_query}");

        let status = if self.config.ssl_temporary_redirect {
            StatusCode::TEMPORARY_REDIRECT
        } else {
            StatusCode::MOVED_PERMANENTLY
        };

        let Ok(location_value) = HeaderValue::from_bytes(location.as_bytes()) else {
            tracing::error!(
                target: "secure",
                location = %location,
                "Redirect target is not a valid header value"
            );
            return Some(HttpResponse::InternalServerError().finish());
        };

        tracing::debug!(
            target: "secure",
            host = %original_host,
            location = %location,
            status = status.as_u16(),
            "Redirecting plain request to HTTPS"
        );

        Some(
            HttpResponse::build(status)
                .insert_header((header::LOCATION, location_value))
                .finish(),
        )
    }
}
