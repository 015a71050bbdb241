//! Mount prefix matching and stripping.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A prefix matches only on a segment boundary (`/proxy` does not match `/proxyx`)
//! - `/` as a prefix mounts the gateway at the root

/// The path segment(s) that route traffic to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPrefix {
    /// Stored without a trailing slash; empty for the root mount.
    prefix: String,
}

impl MountPrefix {
    /// Create a new mount prefix. A trailing `/` is dropped.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    /// The prefix as configured, `/` for the root mount.
    pub fn as_str(&self) -> &str {
        if self.prefix.is_empty() {
            "/"
        } else {
            &self.prefix
        }
    }

    /// Returns true if the path is the prefix itself or lies beneath it.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Remove the prefix from `path`. An empty remainder becomes `/`.
    ///
    /// Paths outside the mount are returned unchanged.
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        if !self.matches(path) {
            return path;
        }
        match &path[self.prefix.len()..] {
            "" => "/",
            rest => rest,
        }
    }
}
