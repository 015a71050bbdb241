//! Per-request failure taxonomy and its HTTP rendering.
//!
//! Every failure raised while normalizing or forwarding a request ends up
//! here exactly once. Upstream 4xx/5xx responses are not failures and never
//! reach this module.

use std::error::Error as StdError;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::routing::NormalizeError;

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Message fragments that identify a certificate failure when the typed
/// rustls error is not reachable through the source chain.
const CERTIFICATE_MARKERS: &[&str] = &[
    "certificate",
    "unknownissuer",
    "self signed",
    "self-signed",
];

/// Errors that can occur while proxying one request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The upstream's identity could not be verified under the configured trust mode.
    #[error("Upstream identity could not be verified: {0}")]
    Certificate(#[source] BoxError),

    /// The upstream did not answer within the configured timeout.
    #[error("Upstream request timed out after {timeout_secs} seconds")]
    Timeout {
        timeout_secs: u64,
        #[source]
        source: BoxError,
    },

    /// DNS, connect, reset or any other transport failure.
    #[error("Upstream request failed: {0}")]
    Transport(#[source] BoxError),

    /// The rewritten request did not form a valid URL.
    #[error(transparent)]
    InvalidTarget(#[from] NormalizeError),

    /// The inbound body could not be read or exceeded the size limit.
    #[error("Failed to read request body: {0}")]
    Body(#[source] axum::Error),
}

impl GatewayError {
    /// Classify a failed upstream call.
    ///
    /// The URL is dropped from the error so request paths cannot influence
    /// message-based classification.
    pub fn from_upstream(err: reqwest::Error, timeout: Duration) -> Self {
        let timed_out = err.is_timeout();
        Self::classify(Box::new(err.without_url()), timed_out, timeout)
    }

    fn classify(err: BoxError, timed_out: bool, timeout: Duration) -> Self {
        if is_certificate_error(&*err) {
            GatewayError::Certificate(err)
        } else if timed_out {
            GatewayError::Timeout {
                timeout_secs: timeout.as_secs(),
                source: err,
            }
        } else {
            GatewayError::Transport(err)
        }
    }

    /// HTTP status the caller receives for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Certificate(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let details = root_cause(self).to_string();
        match self {
            GatewayError::Certificate(source) => ErrorBody {
                error: "SSL Certificate Error",
                message: self.to_string(),
                details,
                original_error: Some(format!("{source:?}")),
            },
            _ => ErrorBody {
                error: "Proxy Error",
                message: self.to_string(),
                details,
                original_error: None,
            },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();

        tracing::error!(
            status = status.as_u16(),
            kind = body.error,
            error = %self,
            details = %body.details,
            "Proxy request failed"
        );

        (status, Json(body)).into_response()
    }
}

/// JSON body of a synthesized error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: &'static str,
    message: String,
    details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_error: Option<String>,
}

/// Walk the source chain looking for a certificate/identity failure.
pub fn is_certificate_error(err: &(dyn StdError + 'static)) -> bool {
    std::iter::successors(Some(err), |&e| e.source()).any(|e| {
        if let Some(tls) = e.downcast_ref::<rustls::Error>() {
            return is_certificate_variant(tls);
        }
        // io::Error::source skips the wrapped error, so look inside explicitly.
        if let Some(tls) = e
            .downcast_ref::<std::io::Error>()
            .and_then(|io| io.get_ref())
            .and_then(|inner| inner.downcast_ref::<rustls::Error>())
        {
            return is_certificate_variant(tls);
        }
        let message = e.to_string().to_ascii_lowercase();
        CERTIFICATE_MARKERS.iter().any(|m| message.contains(m))
    })
}

fn is_certificate_variant(err: &rustls::Error) -> bool {
    matches!(
        err,
        rustls::Error::InvalidCertificate(_)
            | rustls::Error::NoCertificatesPresented
            | rustls::Error::UnsupportedNameType
            | rustls::Error::InvalidCertRevocationList(_)
    )
}

fn root_cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    std::iter::successors(Some(err), |&e| e.source())
        .last()
        .unwrap_or(err)
}
