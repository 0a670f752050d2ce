//! Request inspection helpers.
//!
//! # Responsibilities
//! - Name the request ID header shared by the ID layers
//! - Extract the requested host (Host header, else URI authority)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - HTTP/2 requests carry the host in `:authority`, surfaced as the URI

use axum::http::{header, HeaderName, Request};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The host the client asked for, as sent (port included).
pub fn request_host<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
}

/// The request ID assigned by the request ID layer, if any.
pub fn request_id<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
}
