//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream URL agrees with the trust mode
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{GatewayConfig, TrustMode};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("upstream.base_url `{0}` is not a valid absolute URL")]
    BaseUrl(String),

    #[error("upstream.base_url must not carry a query or fragment")]
    BaseUrlQuery,

    #[error("upstream.base_url scheme `{scheme}` does not match trust mode `{mode}`")]
    SchemeMismatch { scheme: String, mode: &'static str },

    #[error("upstream.trust.ca_path must not be empty")]
    EmptyCaPath,

    #[error("routing.mount_prefix `{0}` must start with '/' and must not end with '/'")]
    MountPrefix(String),

    #[error("routing.artifact_param must not be empty")]
    ArtifactParam,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.has_host() => {
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::BaseUrlQuery);
            }
            let expected = if config.upstream.trust.requires_tls() {
                "https"
            } else {
                "http"
            };
            if url.scheme() != expected {
                errors.push(ValidationError::SchemeMismatch {
                    scheme: url.scheme().to_string(),
                    mode: config.upstream.trust.label(),
                });
            }
        }
        _ => errors.push(ValidationError::BaseUrl(config.upstream.base_url.clone())),
    }

    if !is_valid_prefix(&config.routing.mount_prefix) {
        errors.push(ValidationError::MountPrefix(
            config.routing.mount_prefix.clone(),
        ));
    }

    if config.routing.artifact_param.is_empty() {
        errors.push(ValidationError::ArtifactParam);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    // The CA file itself is read when the client is built.
    if let TrustMode::CustomCa { ca_path } = &config.upstream.trust {
        if ca_path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyCaPath);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `/` alone mounts at the root; anything else is `/segment[/segment...]`.
fn is_valid_prefix(prefix: &str) -> bool {
    prefix == "/" || (prefix.starts_with('/') && !prefix.ends_with('/'))
}
