//! Security policy configuration.

use super::ConfigError;
use crate::policy::BadHostResponder;
use serde::Deserialize;
use std::{collections::HashMap, env, fmt, fs, path::Path, sync::Arc};

/// Prefix shared by every environment variable read by [`SecureConfig::from_env`].
pub const ENV_PREFIX: &str = "SECURE_";

/// One year, in seconds.
const ONE_YEAR_SECONDS: u64 = 31_536_000;

/// Configuration for the security policy middleware
///
/// Every field defaults to its inert value: `false`, `0`, an empty string or an
/// empty collection all mean "feature disabled". `ssl_host` is unset when it is
/// `None` or empty.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecureConfig {
    /// Skip every check and header when set. Meant for local development.
    pub is_development: bool,
    /// Hosts the request `Host` must match (case-insensitive). Empty allows all.
    pub allowed_hosts: Vec<String>,
    /// Produces the response for requests failing the host check.
    /// Falls back to a bare 403 when unset.
    #[serde(skip)]
    pub bad_host_handler: Option<Arc<dyn BadHostResponder>>,
    /// Redirect plain HTTP requests to HTTPS.
    pub ssl_redirect: bool,
    /// Use 307 instead of 301 for the HTTPS redirect.
    pub ssl_temporary_redirect: bool,
    /// Host used in the redirect target instead of the request's own host.
    pub ssl_host: Option<String>,
    /// Header name to expected value; a match means TLS was terminated upstream.
    pub ssl_proxy_headers: HashMap<String, String>,
    /// Exempt literal IPv4 hosts (with or without port) from the HTTPS redirect.
    pub dont_redirect_ipv4_hostnames: bool,
    /// `Strict-Transport-Security` max-age. Zero omits the header.
    pub sts_seconds: u64,
    pub sts_include_subdomains: bool,
    /// `X-Frame-Options` value, takes precedence over `frame_deny`.
    pub custom_frame_options_value: String,
    pub frame_deny: bool,
    pub content_type_nosniff: bool,
    pub browser_xss_filter: bool,
    pub content_security_policy: String,
    pub referrer_policy: String,
    pub feature_policy: String,
    /// `X-Download-Options: noopen`
    pub ie_no_open: bool,
}

impl fmt::Debug for SecureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureConfig")
            .field("is_development", &self.is_development)
            .field("allowed_hosts", &self.allowed_hosts)
            .field("bad_host_handler", &self.bad_host_handler.is_some())
            .field("ssl_redirect", &self.ssl_redirect)
            .field("ssl_temporary_redirect", &self.ssl_temporary_redirect)
            .field("ssl_host", &self.ssl_host)
            .field("ssl_proxy_headers", &self.ssl_proxy_headers)
            .field("dont_redirect_ipv4_hostnames", &self.dont_redirect_ipv4_hostnames)
            .field("sts_seconds", &self.sts_seconds)
            .field("sts_include_subdomains", &self.sts_include_subdomains)
            .field("custom_frame_options_value", &self.custom_frame_options_value)
            .field("frame_deny", &self.frame_deny)
            .field("content_type_nosniff", &self.content_type_nosniff)
            .field("browser_xss_filter", &self.browser_xss_filter)
            .field("content_security_policy", &self.content_security_policy)
            .field("referrer_policy", &self.referrer_policy)
            .field("feature_policy", &self.feature_policy)
            .field("ie_no_open", &self.ie_no_open)
            .finish()
    }
}

impl SecureConfig {
    /// Secure-by-default baseline
    ///
    /// Enables the HTTPS redirect (trusting `X-Forwarded-Proto: https` from a
    /// proxy), a one-year STS including subdomains, frame denial, MIME sniffing
    /// protection, the XSS filter, a same-origin CSP and `X-Download-Options`.
    pub fn secure_defaults() -> Self {
        Self {
            ssl_redirect: true,
            ssl_proxy_headers: HashMap::from([(
                "X-Forwarded-Proto".to_string(),
                "https".to_string(),
            )]),
            sts_seconds: ONE_YEAR_SECONDS,
            sts_include_subdomains: true,
            frame_deny: true,
            content_type_nosniff: true,
            browser_xss_filter: true,
            content_security_policy: "default-src 'self'".to_string(),
            ie_no_open: true,
            ..Self::default()
        }
    }

    /// Attach a responder for requests that fail the host check
    pub fn with_bad_host_handler<R>(mut self, responder: R) -> Self
    where
        R: BadHostResponder + 'static,
    {
        self.bad_host_handler = Some(Arc::new(responder));
        self
    }

    /// The redirect host override, if one is configured
    pub fn ssl_host(&self) -> Option<&str> {
        self.ssl_host.as_deref().filter(|host| !host.is_empty())
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Variable names are the field names upper-cased and prefixed with
    /// [`ENV_PREFIX`]. Unset variables keep the inert default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };
        let mut config = Self::default();

        vars.bool("IS_DEVELOPMENT", &mut config.is_development)?;
        if let Some(hosts) = vars.get("ALLOWED_HOSTS") {
            config.allowed_hosts = split_list(&hosts).map(str::to_string).collect();
        }
        vars.bool("SSL_REDIRECT", &mut config.ssl_redirect)?;
        vars.bool("SSL_TEMPORARY_REDIRECT", &mut config.ssl_temporary_redirect)?;
        config.ssl_host = vars.get("SSL_HOST").filter(|host| !host.is_empty());
        if let Some(headers) = vars.get("SSL_PROXY_HEADERS") {
            config.ssl_proxy_headers = parse_proxy_headers(&headers)?;
        }
        vars.bool(
            "DONT_REDIRECT_IPV4_HOSTNAMES",
            &mut config.dont_redirect_ipv4_hostnames,
        )?;
        if let Some(value) = vars.get("STS_SECONDS") {
            config.sts_seconds = value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: format!("{ENV_PREFIX}STS_SECONDS"),
                value,
            })?;
        }
        vars.bool("STS_INCLUDE_SUBDOMAINS", &mut config.sts_include_subdomains)?;
        vars.string("CUSTOM_FRAME_OPTIONS_VALUE", &mut config.custom_frame_options_value);
        vars.bool("FRAME_DENY", &mut config.frame_deny)?;
        vars.bool("CONTENT_TYPE_NOSNIFF", &mut config.content_type_nosniff)?;
        vars.bool("BROWSER_XSS_FILTER", &mut config.browser_xss_filter)?;
        vars.string("CONTENT_SECURITY_POLICY", &mut config.content_security_policy);
        vars.string("REFERRER_POLICY", &mut config.referrer_policy);
        vars.string("FEATURE_POLICY", &mut config.feature_policy);
        vars.bool("IE_NO_OPEN", &mut config.ie_no_open)?;

        Ok(config)
    }

    /// Parse configuration from a JSON document with snake_case field names
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(&format!("{ENV_PREFIX}{name}"))
    }

    fn string(&self, name: &str, target: &mut String) {
        if let Some(value) = self.get(name) {
            *target = value;
        }
    }

    fn bool(&self, name: &str, target: &mut bool) -> Result<(), ConfigError> {
        let Some(value) = self.get(name) else {
            return Ok(());
        };
        *target = match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => {
                return Err(ConfigError::InvalidBool {
                    var: format!("{ENV_PREFIX}{name}"),
                    value,
                });
            }
        };
        Ok(())
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Parse `Name=value` pairs separated by commas
fn parse_proxy_headers(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    split_list(raw)
        .map(|entry| match entry.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(ConfigError::InvalidProxyHeader {
                entry: entry.to_string(),
            }),
        })
        .collect()
}
