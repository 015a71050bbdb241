//! Outbound header construction.
//!
//! The upstream request carries a constructed header set, never a copy of the
//! inbound one. Cookies, tracing headers, `Host`, `Origin` and anything else
//! the browser sent stay at the gateway.

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderMap, HeaderValue,
};

/// Content type assumed when the caller sent none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Build the headers sent upstream from the inbound headers.
pub fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(2);

    let content_type = inbound
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    headers.insert(CONTENT_TYPE, content_type);

    if let Some(authorization) = inbound.get(AUTHORIZATION) {
        headers.insert(AUTHORIZATION, authorization.clone());
    }

    headers
}
