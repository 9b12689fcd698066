//! Secure Policy - transport and browser security middleware for Actix Web
//!
//! Given a declarative [`SecureConfig`], the middleware:
//! - rejects requests whose `Host` is not on an allow-list
//! - redirects plain HTTP requests to HTTPS, trusting configured proxy headers
//! - writes a fixed set of security response headers (STS, frame options,
//!   CSP, referrer policy, ...)
//!
//! ## Architecture
//!
//! - `config/` - Configuration structure, presets and loaders
//! - `policy/` - Header compilation and per-request evaluation
//! - `middleware/` - Actix Web `Transform` running the policy
//!
//! ## Quick Start
//!
//! ```no_run
//! use actix_web::{App, HttpResponse, HttpServer, web};
//! use secure_policy::{SecureConfig, SecureHeaders};
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let secure = SecureHeaders::new(SecureConfig {
//!         allowed_hosts: vec!["example.com".into(), "ssl.example.com".into()],
//!         ssl_host: Some("ssl.example.com".into()),
//!         ..SecureConfig::secure_defaults()
//!     });
//!
//!     HttpServer::new(move || {
//!         App::new()
//!             .wrap(secure.clone())
//!             .route("/ping", web::get().to(|| async { HttpResponse::Ok().body("pong") }))
//!     })
//!     .bind("127.0.0.1:8080")?
//!     .run()
//!     .await
//! }
//! ```

pub mod config;
pub mod middleware;
pub mod policy;

pub use config::{ConfigError, SecureConfig};
pub use middleware::{SecureHeaders, SecureHeadersMiddleware};
pub use policy::{BadHostResponder, CompiledHeaders, Forbidden, Outcome, Policy, is_ipv4};
