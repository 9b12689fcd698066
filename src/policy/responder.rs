//! Responses for requests rejected by the host allow-list.

use actix_web::{HttpRequest, HttpResponse};

/// Produces the complete response for a request whose host is not allowed
///
/// Implemented for any `Fn(&HttpRequest) -> HttpResponse` closure that can be
/// shared between workers.
pub trait BadHostResponder: Send + Sync {
    fn respond(&self, req: &HttpRequest) -> HttpResponse;
}

impl<F> BadHostResponder for F
where
    F: Fn(&HttpRequest) -> HttpResponse + Send + Sync,
{
    fn respond(&self, req: &HttpRequest) -> HttpResponse {
        self(req)
    }
}

/// Default responder: `403 Forbidden` with an empty body
#[derive(Debug, Clone, Copy, Default)]
pub struct Forbidden;

impl BadHostResponder for Forbidden {
    fn respond(&self, _req: &HttpRequest) -> HttpResponse {
        HttpResponse::Forbidden().finish()
    }
}
