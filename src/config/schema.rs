//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream origin and how to trust it.
    pub upstream: UpstreamConfig,

    /// Mount prefix and routing-artifact handling.
    pub routing: RoutingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// CORS policy.
    pub cors: CorsConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL every request is forwarded to (e.g., "https://api.example.com").
    pub base_url: String,

    /// How the upstream's identity is validated.
    pub trust: TrustMode,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:8443".to_string(),
            trust: TrustMode::Validate,
        }
    }
}

/// Upstream transport trust mode, selected once at startup.
///
/// There is intentionally no variant that accepts any certificate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TrustMode {
    /// Validate the upstream certificate against the built-in root store.
    #[default]
    Validate,

    /// Validate against the built-in roots plus a PEM trust anchor.
    CustomCa {
        /// Path to the PEM file holding one or more CA certificates.
        ca_path: PathBuf,
    },

    /// Plain HTTP to the upstream. Only valid with an `http://` base URL.
    Plaintext,
}

impl TrustMode {
    /// Whether this mode expects an `https` upstream.
    pub fn requires_tls(&self) -> bool {
        !matches!(self, TrustMode::Plaintext)
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            TrustMode::Validate => "validate",
            TrustMode::CustomCa { .. } => "custom_ca",
            TrustMode::Plaintext => "plaintext",
        }
    }
}

/// Routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Path prefix that routes traffic to the gateway; stripped before forwarding.
    pub mount_prefix: String,

    /// Query parameter injected by a front-end rewrite layer; never forwarded.
    pub artifact_param: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            mount_prefix: "/api/proxy".to_string(),
            artifact_param: "path".to_string(),
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 30,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value list for `Access-Control-Allow-Headers`.
    pub allow_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_headers: [
                "X-CSRF-Token",
                "X-Requested-With",
                "Accept",
                "Accept-Version",
                "Content-Length",
                "Content-MD5",
                "Content-Type",
                "Date",
                "X-Api-Version",
                "Authorization",
            ]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size buffered for forwarding.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
