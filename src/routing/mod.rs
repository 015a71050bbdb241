//! Request normalization subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound URI (path + query)
//!     → prefix.rs (strip mount prefix, empty ⇒ "/")
//!     → query.rs (drop routing-artifact parameter)
//!     → target.rs (join with fixed upstream base)
//!     → Return: TargetUrl
//! ```
//!
//! # Design Decisions
//! - Normalizer built once at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always yields the same target

pub mod prefix;
pub mod query;
pub mod target;

pub use prefix::MountPrefix;
pub use target::{NormalizeError, Normalizer, TargetUrl};
