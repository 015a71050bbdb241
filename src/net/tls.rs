//! Upstream trust configuration and certificate loading.

use std::path::{Path, PathBuf};

use reqwest::{Certificate, ClientBuilder};
use thiserror::Error;

use crate::config::TrustMode;

/// Errors raised while preparing the upstream trust store.
#[derive(Debug, Error)]
pub enum TrustError {
    #[error("Trust anchor file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read trust anchor {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid PEM in trust anchor {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },

    #[error("Trust anchor {0:?} contains no certificates")]
    Empty(PathBuf),

    #[error("Failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Load every certificate from a PEM bundle.
pub fn load_trust_anchors(path: &Path) -> Result<Vec<Certificate>, TrustError> {
    if !path.exists() {
        return Err(TrustError::NotFound(path.to_path_buf()));
    }

    let pem = std::fs::read(path).map_err(|source| TrustError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let certs = Certificate::from_pem_bundle(&pem).map_err(|source| TrustError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if certs.is_empty() {
        return Err(TrustError::Empty(path.to_path_buf()));
    }

    Ok(certs)
}

/// Configure a client builder for the selected trust mode.
///
/// TLS modes refuse plain `http` requests so a redirect can never downgrade
/// the channel.
pub fn apply_trust_mode(
    builder: ClientBuilder,
    mode: &TrustMode,
) -> Result<ClientBuilder, TrustError> {
    match mode {
        TrustMode::Validate => {
            tracing::info!(trust_mode = mode.label(), "Upstream certificates validated against built-in roots");
            Ok(builder.https_only(true))
        }
        TrustMode::CustomCa { ca_path } => {
            let certs = load_trust_anchors(ca_path)?;
            tracing::info!(
                trust_mode = mode.label(),
                ca_path = %ca_path.display(),
                anchors = certs.len(),
                "Upstream certificates validated against custom trust anchor"
            );
            let builder = certs
                .into_iter()
                .fold(builder, |b, cert| b.add_root_certificate(cert));
            Ok(builder.https_only(true))
        }
        TrustMode::Plaintext => {
            tracing::warn!(
                trust_mode = mode.label(),
                "Upstream traffic is NOT encrypted and the upstream identity is NOT verified"
            );
            Ok(builder)
        }
    }
}
