//! Upstream client subsystem.
//!
//! # Data Flow
//! ```text
//! TargetUrl + inbound parts
//!     → headers.rs (construct Content-Type / Authorization)
//!     → forwarder.rs (send with timeout, follow ≤5 redirects)
//!     → reqwest::Response (any status) or GatewayError
//! ```

pub mod forwarder;
pub mod headers;

pub use forwarder::{Forwarder, OutboundRequest, MAX_REDIRECTS};
pub use headers::{outbound_headers, DEFAULT_CONTENT_TYPE};
