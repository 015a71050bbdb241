//! Target URL assembly.

use std::fmt;

use axum::http::Uri;
use url::Url;

use crate::routing::prefix::MountPrefix;
use crate::routing::query::strip_param;

/// Fully resolved upstream URL for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl(Url);

impl TargetUrl {
    /// Join `base`, an already-rewritten path and an optional query.
    ///
    /// The result must stay beneath the base path; dot segments that climb out
    /// of it are rejected.
    pub fn build(base: &Url, path: &str, query: Option<&str>) -> Result<Self, NormalizeError> {
        let mut raw = String::with_capacity(base.as_str().len() + path.len() + 16);
        raw.push_str(base.as_str().trim_end_matches('/'));
        if !path.starts_with('/') {
            raw.push('/');
        }
        raw.push_str(path);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            raw.push('?');
            raw.push_str(query);
        }
        let url = Url::parse(&raw).map_err(|source| NormalizeError::Parse {
            raw: raw.clone(),
            source,
        })?;

        let base_path = base.path().trim_end_matches('/');
        let path = url.path();
        if path != base_path && !path.starts_with(&format!("{base_path}/")) {
            return Err(NormalizeError::OutsideBase(raw));
        }
        Ok(Self(url))
    }

    pub fn into_url(self) -> Url {
        self.0
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Failure to turn an inbound URI into a target URL.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("invalid target URL `{raw}`: {source}")]
    Parse {
        raw: String,
        #[source]
        source: url::ParseError,
    },

    #[error("target URL `{0}` resolves outside the upstream base path")]
    OutsideBase(String),
}

/// Rewrites inbound URIs into upstream target URLs.
///
/// Built once from configuration; holds no per-request state.
#[derive(Debug, Clone)]
pub struct Normalizer {
    base: Url,
    prefix: MountPrefix,
    artifact_param: String,
}

impl Normalizer {
    pub fn new(base: Url, prefix: MountPrefix, artifact_param: impl Into<String>) -> Self {
        Self {
            base,
            prefix,
            artifact_param: artifact_param.into(),
        }
    }

    pub fn prefix(&self) -> &MountPrefix {
        &self.prefix
    }

    /// The rewritten path and filtered query, without the upstream base.
    pub fn rewrite(&self, uri: &Uri) -> (String, Option<String>) {
        let path = self.prefix.strip(uri.path()).to_string();
        let query = strip_param(uri.query(), &self.artifact_param);
        (path, query)
    }

    /// Produce the upstream URL for an inbound request URI.
    pub fn normalize(&self, uri: &Uri) -> Result<TargetUrl, NormalizeError> {
        let (path, query) = self.rewrite(uri);
        TargetUrl::build(&self.base, &path, query.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer(base: &str) -> Normalizer {
        Normalizer::new(
            Url::parse(base).unwrap(),
            MountPrefix::new("/api/proxy"),
            "path",
        )
    }

    fn target(n: &Normalizer, uri: &str) -> String {
        n.normalize(&uri.parse::<Uri>().unwrap()).unwrap().to_string()
    }

    #[test]
    fn test_prefix_only_resolves_to_root() {
        let n = normalizer("https://api.example.com");
        assert_eq!(target(&n, "/api/proxy"), "https://api.example.com/");
        assert_eq!(target(&n, "/api/proxy?path=/"), "https://api.example.com/");
    }

    #[test]
    fn test_path_and_query_rewrite() {
        let n = normalizer("https://api.example.com");
        assert_eq!(
            target(&n, "/api/proxy/chat/message?path=/chat/message&limit=10"),
            "https://api.example.com/chat/message?limit=10"
        );
    }

    #[test]
    fn test_no_trailing_question_mark() {
        let n = normalizer("https://api.example.com");
        let url = target(&n, "/api/proxy/users?path=users");
        assert_eq!(url, "https://api.example.com/users");
        assert!(!url.ends_with('?'));
    }

    #[test]
    fn test_base_path_is_kept() {
        let n = normalizer("https://api.example.com/v1/");
        assert_eq!(target(&n, "/api/proxy/users/7"), "https://api.example.com/v1/users/7");
        assert_eq!(target(&n, "/api/proxy"), "https://api.example.com/v1/");
    }

    #[test]
    fn test_dot_segments_cannot_leave_base_path() {
        let n = normalizer("https://api.example.com/v1");
        for uri in [
            "/api/proxy/..",
            "/api/proxy/../admin",
            "/api/proxy/%2e%2e/admin",
            "/api/proxy/a/../../admin",
        ] {
            let err = n.normalize(&uri.parse::<Uri>().unwrap()).unwrap_err();
            assert!(matches!(err, NormalizeError::OutsideBase(_)), "{uri} escaped");
        }

        // Dot segments that stay beneath the base path are fine.
        assert_eq!(target(&n, "/api/proxy/a/../users"), "https://api.example.com/v1/users");
    }

    #[test]
    fn test_rewrite_parts() {
        let n = normalizer("http://127.0.0.1:3000");
        let (path, query) = n.rewrite(&"/api/proxy/a?b=1&path=a".parse().unwrap());
        assert_eq!(path, "/a");
        assert_eq!(query.as_deref(), Some("b=1"));
        assert_eq!(n.prefix().as_str(), "/api/proxy");
    }

    #[test]
    fn test_path_cannot_change_host() {
        let base = Url::parse("http://localhost").unwrap();
        assert!(TargetUrl::build(&base, "/ok", None).is_ok());

        let url = TargetUrl::build(&base, "//evil.example/x", None).unwrap();
        assert_eq!(url.0.host_str(), Some("localhost"));
    }
}
