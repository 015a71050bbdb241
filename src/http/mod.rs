//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign request ID)
//!     → cors.rs (CORS headers; OPTIONS answered here)
//!     → routing::Normalizer (target URL)
//!     → upstream::Forwarder (single outbound call)
//!     → response.rs (status + filtered headers + streamed body)
//!     → Send to client
//! ```

pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use cors::{cors_middleware, CorsPolicy};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, GatewayServer, ServerError};
