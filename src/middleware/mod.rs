//! Custom middleware implementations.
//!
//! This module contains the actix-web middleware that runs the security
//! policy in front of the application's handlers.

pub mod security;

pub use security::*;
