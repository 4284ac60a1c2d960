//! Request identification.
//!
//! # Responsibilities
//! - Name the request-id header set by `SetRequestIdLayer`
//! - Build the per-request tracing span carrying that id
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied x-request-id is kept, not replaced

use axum::body::Body;
use axum::http::{HeaderMap, Request};

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The request id, or "unknown" if the header is absent or not ASCII.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span used by the trace layer for every inbound request.
pub fn make_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request.headers()),
    )
}
