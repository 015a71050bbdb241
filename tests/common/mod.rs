//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use cors_gateway::config::{GatewayConfig, TrustMode};
use cors_gateway::{GatewayServer, Shutdown};
use serde_json::json;
use tokio::net::TcpListener;

/// Counts requests that reached the mock upstream.
#[derive(Clone, Default)]
pub struct UpstreamHits(Arc<AtomicUsize>);

impl UpstreamHits {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Router for the mock upstream.
///
/// - `/status/{code}` answers with that status and a JSON body
/// - `/slow` answers after 3 seconds
/// - `/redirect` answers 302 to `/landing`
/// - `/secure-headers` answers with hosting-layer headers set
/// - anything else echoes the request it received as JSON
pub fn upstream_app(hits: UpstreamHits) -> Router {
    Router::new().fallback(upstream_handler).with_state(hits)
}

async fn upstream_handler(State(hits): State<UpstreamHits>, request: Request<Body>) -> Response {
    hits.0.fetch_add(1, Ordering::SeqCst);

    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let path = parts.uri.path();

    if let Some(code) = path.strip_prefix("/status/") {
        let status = code
            .parse()
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
            .unwrap_or(StatusCode::IM_A_TEAPOT);
        return (status, Json(json!({ "upstreamStatus": status.as_u16() }))).into_response();
    }

    match path {
        "/slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            "too late".into_response()
        }
        "/redirect" => (StatusCode::FOUND, [(header::LOCATION, "/landing")]).into_response(),
        "/secure-headers" => (
            [
                ("server", "upstream/1.0"),
                ("x-content-type-options", "nosniff"),
                ("x-frame-options", "DENY"),
                ("x-xss-protection", "1; mode=block"),
                ("strict-transport-security", "max-age=63072000"),
                ("content-security-policy", "default-src 'self'"),
                ("permissions-policy", "camera=()"),
                ("referrer-policy", "no-referrer"),
                ("cross-origin-opener-policy", "same-origin"),
                ("cross-origin-resource-policy", "same-origin"),
                ("x-upstream-trace", "abc123"),
                ("cache-control", "no-store"),
            ],
            "secured",
        )
            .into_response(),
        _ => {
            let headers: BTreeMap<String, String> = parts
                .headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect();
            Json(json!({
                "method": parts.method.as_str(),
                "path": path,
                "query": parts.uri.query(),
                "headers": headers,
                "body": String::from_utf8_lossy(&body),
            }))
            .into_response()
        }
    }
}

/// Start a plain HTTP mock upstream on an ephemeral port.
pub async fn start_upstream() -> (SocketAddr, UpstreamHits) {
    let hits = UpstreamHits::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = upstream_app(hits.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, hits)
}

/// Gateway config pointing at a plaintext upstream.
pub fn plaintext_config(upstream: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = format!("http://{upstream}");
    config.upstream.trust = TrustMode::Plaintext;
    config
}

/// Start the gateway on an ephemeral port.
///
/// The listener is bound before returning, so requests can be sent immediately.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let server = GatewayServer::new(config).expect("gateway config");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Test client that never follows redirects itself.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}
