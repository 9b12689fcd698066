//! Security policy engine.
//!
//! The configuration is compiled once into a fixed header set
//! ([`CompiledHeaders`]); a [`Policy`] then evaluates each request against the
//! host allow-list and the HTTPS requirement.

pub mod evaluator;
pub mod headers;
pub mod host;
pub mod responder;

pub use evaluator::*;
pub use headers::{CompiledHeaders, seed_headers};
pub use host::{is_ipv4, request_host};
pub use responder::*;
