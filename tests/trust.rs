//! Upstream trust modes against a TLS upstream signed by a private test CA.

use std::net::SocketAddr;

use axum_server::tls_rustls::RustlsConfig;
use cors_gateway::config::{GatewayConfig, TrustMode};
use reqwest::StatusCode;
use serde_json::Value;

mod common;

/// Start a TLS mock upstream using the fixture certificate (issued for 127.0.0.1).
async fn start_tls_upstream() -> (SocketAddr, common::UpstreamHits) {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let tls = RustlsConfig::from_pem_file(
        common::fixture("upstream.pem"),
        common::fixture("upstream.key"),
    )
    .await
    .expect("fixture certificate");

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    let hits = common::UpstreamHits::default();
    let app = common::upstream_app(hits.clone());
    tokio::spawn(async move {
        let _ = axum_server::from_tcp_rustls(listener, tls)
            .serve(app.into_make_service())
            .await;
    });

    (addr, hits)
}

fn tls_config(upstream: SocketAddr, trust: TrustMode) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = format!("https://{upstream}");
    config.upstream.trust = trust;
    config
}

#[tokio::test]
async fn test_untrusted_certificate_is_ssl_error() {
    let (upstream, hits) = start_tls_upstream().await;
    let (gateway, shutdown) =
        common::start_gateway(tls_config(upstream, TrustMode::Validate)).await;

    let res = common::client()
        .get(format!("http://{gateway}/api/proxy/users"))
        .header("Origin", "https://app.example")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.headers()["access-control-allow-origin"], "https://app.example");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "SSL Certificate Error");
    assert!(body["message"].is_string());
    assert!(body["details"].is_string());
    assert!(body["originalError"].is_string());
    assert_eq!(hits.count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_custom_trust_anchor_accepts_upstream() {
    let (upstream, hits) = start_tls_upstream().await;
    let trust = TrustMode::CustomCa {
        ca_path: common::fixture("ca.pem"),
    };
    let (gateway, shutdown) = common::start_gateway(tls_config(upstream, trust)).await;

    let res = common::client()
        .get(format!("http://{gateway}/api/proxy/users?path=users&page=2"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let echo: Value = res.json().await.unwrap();
    assert_eq!(echo["path"], "/users");
    assert_eq!(echo["query"], "page=2");
    assert_eq!(hits.count(), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_custom_anchor_relays_upstream_errors() {
    let (upstream, _) = start_tls_upstream().await;
    let trust = TrustMode::CustomCa {
        ca_path: common::fixture("ca.pem"),
    };
    let (gateway, shutdown) = common::start_gateway(tls_config(upstream, trust)).await;

    let res = common::client()
        .get(format!("http://{gateway}/api/proxy/status/403"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    shutdown.trigger();
}
