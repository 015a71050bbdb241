//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the proxy handler
//! - Wire up middleware (request ID, tracing, CORS)
//! - Bind server to listener
//! - Normalize, forward and relay each request

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, header::InvalidHeaderValue, HeaderValue, Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::cors::{cors_middleware, CorsPolicy};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response;
use crate::lifecycle::shutdown::wait_for;
use crate::net::TrustError;
use crate::routing::{MountPrefix, Normalizer};
use crate::upstream::{Forwarder, OutboundRequest};

/// Methods forwarded upstream. `OPTIONS` is answered by the CORS gate.
const FORWARDED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Errors that prevent the server from being constructed.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid upstream base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error(transparent)]
    Trust(#[from] TrustError),

    #[error("Invalid CORS allow-headers list: {0}")]
    Cors(#[from] InvalidHeaderValue),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub normalizer: Arc<Normalizer>,
    pub forwarder: Forwarder,
    pub max_body_bytes: usize,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server from validated configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let base = Url::parse(&config.upstream.base_url)?;
        let normalizer = Normalizer::new(
            base,
            MountPrefix::new(config.routing.mount_prefix.as_str()),
            config.routing.artifact_param.as_str(),
        );
        let forwarder = Forwarder::new(&config.upstream, &config.timeouts)?;
        let cors = CorsPolicy::new(&config.cors)?;

        let state = AppState {
            normalizer: Arc::new(normalizer),
            forwarder,
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(state, cors);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, cors: CorsPolicy) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                Arc::new(cors),
                cors_middleware,
            ))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            mount_prefix = %self.config.routing.mount_prefix,
            trust_mode = self.config.upstream.trust.label(),
            "Gateway listening"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

fn make_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request.request_id(),
    )
}

/// Main proxy handler: normalize, forward, relay.
async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    if !state.normalizer.prefix().matches(request.uri().path()) {
        tracing::debug!(path = %request.uri().path(), "Request outside mount prefix");
        return Ok(not_found());
    }
    if !FORWARDED_METHODS.contains(request.method()) {
        return Ok(method_not_allowed());
    }

    let (parts, body) = request.into_parts();
    let target = state.normalizer.normalize(&parts.uri)?;
    let body = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(GatewayError::Body)?;

    tracing::debug!(
        method = %parts.method,
        target = %target,
        body_bytes = body.len(),
        "Forwarding request"
    );

    let upstream = state
        .forwarder
        .forward(OutboundRequest::new(parts.method, target, &parts.headers, body))
        .await?;

    tracing::info!(status = upstream.status().as_u16(), "Relaying upstream response");
    Ok(response::relay(upstream))
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" }))).into_response()
}

fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(
            header::ALLOW,
            HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
        )],
        Json(json!({ "error": "Method Not Allowed" })),
    )
        .into_response()
}
