//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build the single upstream client (timeouts, redirects, trust mode)
//! - Send one outbound request per inbound request
//! - Report transport outcomes only; status codes are never inspected

use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    http::{HeaderMap, Method},
};
use reqwest::redirect::Policy;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::error::GatewayError;
use crate::net::{apply_trust_mode, TrustError};
use crate::routing::TargetUrl;
use crate::upstream::headers::outbound_headers;

/// Redirect hops the transport follows on its own.
pub const MAX_REDIRECTS: usize = 5;

/// A request ready to be sent upstream.
#[derive(Debug)]
pub struct OutboundRequest {
    pub method: Method,
    pub target: TargetUrl,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OutboundRequest {
    /// Assemble an outbound request from inbound parts.
    pub fn new(method: Method, target: TargetUrl, inbound_headers: &HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            target,
            headers: outbound_headers(inbound_headers),
            body,
        }
    }
}

/// Sends requests to the configured upstream.
///
/// Cloning is cheap: the underlying connection pool is shared. Each call owns
/// its connection checkout until the returned response (or error) is dropped.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    timeout: Duration,
}

impl Forwarder {
    /// Build the forwarder for the given upstream and timeouts.
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, TrustError> {
        let builder = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .redirect(Policy::limited(MAX_REDIRECTS))
            .no_proxy();

        let client = apply_trust_mode(builder, &upstream.trust)?.build()?;

        Ok(Self {
            client,
            timeout: timeouts.request(),
        })
    }

    /// Forward one request. Any status code is a successful outcome.
    pub async fn forward(&self, request: OutboundRequest) -> Result<reqwest::Response, GatewayError> {
        let start = Instant::now();
        let method = request.method.clone();
        let target = request.target.to_string();

        let mut builder = self
            .client
            .request(request.method, request.target.into_url())
            .headers(request.headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        match builder.send().await {
            Ok(response) => {
                tracing::debug!(
                    method = %method,
                    target = %target,
                    status = response.status().as_u16(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Upstream responded"
                );
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(
                    method = %method,
                    target = %target,
                    timeout = e.is_timeout(),
                    connect = e.is_connect(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "Upstream request failed"
                );
                Err(GatewayError::from_upstream(e, self.timeout))
            }
        }
    }
}
