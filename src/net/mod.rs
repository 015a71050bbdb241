//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     TrustMode (config)
//!     → tls.rs (load trust anchors, pin https-only)
//!     → reqwest ClientBuilder handed to the forwarder
//! ```
//!
//! # Design Decisions
//! - Trust is decided once per process, never per request
//! - No mode accepts unverified certificates over TLS
//! - Plaintext must be configured explicitly and is logged at warn level

pub mod tls;

pub use tls::{apply_trust_mode, load_trust_anchors, TrustError};
