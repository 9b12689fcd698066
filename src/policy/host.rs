//! Request host extraction and classification.

use actix_web::{HttpRequest, http::header};
use std::net::Ipv4Addr;

/// The host the request was addressed to
///
/// Uses the `Host` header, falling back to the authority of the request target
/// when the header is missing or empty (absolute-form targets sent to a proxy,
/// HTTP/2 `:authority`). The header is read as UTF-8, so internationalized
/// hosts sent unencoded are kept. Returns an empty string when neither is
/// present.
pub fn request_host(req: &HttpRequest) -> &str {
    req.headers()
        .get(header::HOST)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
        .filter(|host| !host.is_empty())
        .or_else(|| {
            req.uri()
                .authority()
                .and_then(|authority| authority.as_str().rsplit('@').next())
        })
        .unwrap_or("")
}

/// Whether `host`, with an optional `:port` suffix, is a literal IPv4 address
pub fn is_ipv4(host: &str) -> bool {
    let host = match host.split_once(':') {
        Some((address, _port)) => address,
        None => host,
    };
    host.parse::<Ipv4Addr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::header::HeaderValue, test::TestRequest};

    #[test]
    fn ipv4_literals() {
        assert!(is_ipv4("127.0.0.1"));
        assert!(is_ipv4("127.0.0.1:8080"));
        assert!(!is_ipv4("localhost"));
        assert!(!is_ipv4("localhost:8080"));
        assert!(!is_ipv4("example.com"));
        assert!(!is_ipv4("example.com:8080"));
    }

    #[test]
    fn ipv6_and_malformed_hosts_are_not_ipv4() {
        assert!(!is_ipv4("::1"));
        assert!(!is_ipv4("[::1]:8080"));
        assert!(!is_ipv4("256.0.0.1"));
        assert!(!is_ipv4("1.2.3"));
        assert!(!is_ipv4(""));
    }

    #[test]
    fn host_header_wins_over_target() {
        let req = TestRequest::default()
            .uri("http://target.example.com/foo")
            .insert_header((header::HOST, "www.example.com"))
            .to_http_request();
        assert_eq!(request_host(&req), "www.example.com");
    }

    #[test]
    fn falls_back_to_target_authority() {
        let req = TestRequest::default()
            .uri("http://127.0.0.1:8080/foo")
            .to_http_request();
        assert_eq!(request_host(&req), "127.0.0.1:8080");
    }

    #[test]
    fn utf8_host_header_is_kept() {
        let req = TestRequest::default()
            .uri("/foo")
            .insert_header((
                header::HOST,
                HeaderValue::from_bytes("bücher.example.com".as_bytes()).unwrap(),
            ))
            .to_http_request();
        assert_eq!(request_host(&req), "bücher.example.com");
    }

    #[test]
    fn missing_host_is_empty() {
        let req = TestRequest::default().uri("/foo").to_http_request();
        assert_eq!(request_host(&req), "");
    }
}
