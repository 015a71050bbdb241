//! Response relay.
//!
//! # Responsibilities
//! - Copy the upstream status code unchanged
//! - Drop upstream headers the gateway's hosting layer owns
//! - Stream the upstream body without re-encoding
//!
//! # Design Decisions
//! - Status codes are never inspected; 4xx/5xx relay like 2xx
//! - Multi-valued headers keep every value
//! - Relaying cannot fail; body errors surface as a truncated stream

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName},
    response::Response,
};

/// Response headers never relayed to the caller.
pub const DENIED_RESPONSE_HEADERS: [HeaderName; 12] = [
    header::X_CONTENT_TYPE_OPTIONS,
    header::X_FRAME_OPTIONS,
    header::X_XSS_PROTECTION,
    header::STRICT_TRANSPORT_SECURITY,
    header::CONTENT_SECURITY_POLICY,
    HeaderName::from_static("permissions-policy"),
    header::REFERRER_POLICY,
    HeaderName::from_static("cross-origin-opener-policy"),
    HeaderName::from_static("cross-origin-resource-policy"),
    header::SERVER,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
];

/// Returns true if the header must not be relayed.
///
/// `HeaderName` is always lower-case, so comparison is case-insensitive.
pub fn is_denied(name: &HeaderName) -> bool {
    DENIED_RESPONSE_HEADERS.contains(name)
}

/// Copy every header except the denied ones.
pub fn filter_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream.iter() {
        if !is_denied(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Turn an upstream response into the caller's response.
pub fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = filter_headers(upstream.headers());

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
