//! Compilation of the configuration into fixed response headers.

use crate::config::SecureConfig;
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};

pub const X_FRAME_OPTIONS: HeaderName = HeaderName::from_static("x-frame-options");
pub const X_CONTENT_TYPE_OPTIONS: HeaderName = HeaderName::from_static("x-content-type-options");
pub const X_XSS_PROTECTION: HeaderName = HeaderName::from_static("x-xss-protection");
pub const CONTENT_SECURITY_POLICY: HeaderName = HeaderName::from_static("content-security-policy");
pub const REFERRER_POLICY: HeaderName = HeaderName::from_static("referrer-policy");
pub const STRICT_TRANSPORT_SECURITY: HeaderName =
    HeaderName::from_static("strict-transport-security");
pub const X_DOWNLOAD_OPTIONS: HeaderName = HeaderName::from_static("x-download-options");
pub const FEATURE_POLICY: HeaderName = HeaderName::from_static("feature-policy");

/// Ordered set of headers written on every non-development response
///
/// Built once from a [`SecureConfig`] and never mutated afterwards. The order
/// is stable: frame options, content type options, XSS protection, CSP,
/// referrer policy, STS, download options, feature policy.
#[derive(Debug, Clone, Default)]
pub struct CompiledHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl CompiledHeaders {
    pub fn compile(config: &SecureConfig) -> Self {
        let mut compiled = Self::default();

        if !config.custom_frame_options_value.is_empty() {
            compiled.push(X_FRAME_OPTIONS, &config.custom_frame_options_value);
        } else if config.frame_deny {
            compiled.push_static(X_FRAME_OPTIONS, "DENY");
        }

        if config.content_type_nosniff {
            compiled.push_static(X_CONTENT_TYPE_OPTIONS, "nosniff");
        }

        if config.browser_xss_filter {
            compiled.push_static(X_XSS_PROTECTION, "1; mode=block");
        }

        if !config.content_security_policy.is_empty() {
            compiled.push(CONTENT_SECURITY_POLICY, &config.content_security_policy);
        }

        if !config.referrer_policy.is_empty() {
            compiled.push(REFERRER_POLICY, &config.referrer_policy);
        }

        if config.sts_seconds != 0 {
            compiled.push(
                STRICT_TRANSPORT_SECURITY,
                &sts_value(config.sts_seconds, config.sts_include_subdomains),
            );
        }

        if config.ie_no_open {
            compiled.push_static(X_DOWNLOAD_OPTIONS, "noopen");
        }

        if !config.feature_policy.is_empty() {
            compiled.push(FEATURE_POLICY, &config.feature_policy);
        }

        compiled
    }

    fn push_static(&mut self, name: HeaderName, value: &'static str) {
        self.headers.push((name, HeaderValue::from_static(value)));
    }

    fn push(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(value) => self.headers.push((name, value)),
            Err(_) => tracing::warn!(
                target: "secure",
                header = %name,
                value = %value,
                "Skipping header with a value that is not a valid HTTP header value"
            ),
        }
    }

    /// Write every header into `target`, replacing existing values
    pub fn write_to(&self, target: &mut HeaderMap) {
        for (name, value) in self.iter() {
            target.insert(name.clone(), value.clone());
        }
    }

    pub fn get(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &HeaderName> {
        self.headers.iter().map(|(name, _)| name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(HeaderName, HeaderValue)> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

fn sts_value(seconds: u64, include_subdomains: bool) -> String {
    if include_subdomains {
        format!("max-age={seconds}; includeSubdomains")
    } else {
        format!("max-age={seconds}")
    }
}

/// Copy `written` onto a finished response
///
/// The headers were written before the handler produced its response, so any
/// header the handler set itself is left as the handler set it.
pub fn seed_headers(target: &mut HeaderMap, written: &HeaderMap) {
    for (name, value) in written.iter() {
        if !target.contains_key(name) {
            target.insert(name.clone(), value.clone());
        }
    }
}
